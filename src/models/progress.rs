use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 成就分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Streak,
    Sessions,
    Subjects,
    Special,
}

/// 已解锁的成就
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub unlocked_at: DateTime<Utc>,
}

/// 成就定义：满足 `trigger` 时解锁
struct AchievementDefinition {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    category: AchievementCategory,
    trigger: fn(&UserProgress) -> bool,
}

const ACHIEVEMENT_DEFINITIONS: &[AchievementDefinition] = &[
    AchievementDefinition {
        id: "first-session",
        title: "Getting Started",
        description: "Complete your first learning session",
        icon: "🎯",
        category: AchievementCategory::Sessions,
        trigger: |p| p.total_sessions >= 1,
    },
    AchievementDefinition {
        id: "week-streak",
        title: "Week Warrior",
        description: "Maintain a 7-day learning streak",
        icon: "🔥",
        category: AchievementCategory::Streak,
        trigger: |p| p.streak_days >= 7,
    },
    AchievementDefinition {
        id: "polymath",
        title: "Polymath",
        description: "Study 5 different subjects",
        icon: "🧠",
        category: AchievementCategory::Subjects,
        trigger: |p| p.subjects.len() >= 5,
    },
    AchievementDefinition {
        id: "century",
        title: "Century Club",
        description: "Send 100 messages",
        icon: "💬",
        category: AchievementCategory::Sessions,
        trigger: |p| p.total_messages >= 100,
    },
];

/// 学习风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    #[default]
    Mixed,
}

/// 难度偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LearningPreferences {
    pub style: LearningStyle,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
}

/// 用户学习进度
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub total_sessions: u32,
    pub total_messages: u32,
    /// 科目 → 会话数
    pub subjects: BTreeMap<String, u32>,
    pub streak_days: u32,
    pub last_active_date: Option<NaiveDate>,
    pub achievements: Vec<Achievement>,
    pub learning_preferences: LearningPreferences,
}

impl UserProgress {
    /// 记录新会话
    pub fn record_session(&mut self, subject: &str) {
        self.total_sessions += 1;
        *self.subjects.entry(subject.to_string()).or_insert(0) += 1;
    }

    /// 记录新消息
    pub fn record_message(&mut self) {
        self.total_messages += 1;
    }

    /// 记录当天有学习活动，维护连续学习天数
    pub fn record_activity(&mut self, today: NaiveDate) {
        self.streak_days = match self.last_active_date {
            Some(last) if last == today => self.streak_days.max(1),
            Some(last) if last.succ_opt() == Some(today) => self.streak_days + 1,
            _ => 1,
        };
        self.last_active_date = Some(today);
    }

    /// 解锁新满足条件的成就，返回本次新解锁的部分
    pub fn unlock_achievements(&mut self, now: DateTime<Utc>) -> Vec<Achievement> {
        let unlocked: Vec<Achievement> = ACHIEVEMENT_DEFINITIONS
            .iter()
            .filter(|def| !self.has_achievement(def.id) && (def.trigger)(self))
            .map(|def| Achievement {
                id: def.id.to_string(),
                title: def.title.to_string(),
                description: def.description.to_string(),
                icon: def.icon.to_string(),
                category: def.category,
                unlocked_at: now,
            })
            .collect();

        self.achievements.extend(unlocked.iter().cloned());
        unlocked
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_session_unlocks_once() {
        let mut progress = UserProgress::default();
        assert!(progress.unlock_achievements(Utc::now()).is_empty());

        progress.record_session("Math");
        let unlocked = progress.unlock_achievements(Utc::now());
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].id, "first-session");

        progress.record_session("Math");
        assert!(progress.unlock_achievements(Utc::now()).is_empty());
        assert_eq!(progress.achievements.len(), 1);
        assert_eq!(progress.subjects["Math"], 2);
    }

    #[test]
    fn test_polymath_and_century() {
        let mut progress = UserProgress::default();
        for subject in ["Math", "Physics", "History", "Art", "Biology"] {
            progress.record_session(subject);
        }
        for _ in 0..100 {
            progress.record_message();
        }
        let ids: Vec<String> = progress
            .unlock_achievements(Utc::now())
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["first-session", "polymath", "century"]);
    }

    #[test]
    fn test_streak_tracking() {
        let mut progress = UserProgress::default();
        progress.record_activity(date(2026, 3, 1));
        assert_eq!(progress.streak_days, 1);

        progress.record_activity(date(2026, 3, 1));
        assert_eq!(progress.streak_days, 1);

        for day in 2..=7 {
            progress.record_activity(date(2026, 3, day));
        }
        assert_eq!(progress.streak_days, 7);
        assert!(progress
            .unlock_achievements(Utc::now())
            .iter()
            .any(|a| a.id == "week-streak"));

        // 中断后重新计数
        progress.record_activity(date(2026, 3, 10));
        assert_eq!(progress.streak_days, 1);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let mut progress = UserProgress::default();
        progress.record_activity(date(2026, 2, 28));
        progress.record_activity(date(2026, 3, 1));
        assert_eq!(progress.streak_days, 2);
    }
}
