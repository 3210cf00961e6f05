//! 批量答卷处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：初始化报告文件，创建阅卷流程
//! 2. **批量加载**：扫描并加载所有待批改的答卷（`Vec<Submission>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总所有答卷的处理结果

use crate::config::Config;
use crate::models::submission::Submission;
use crate::orchestrator::submission_processor;
use crate::services::ReportWriter;
use crate::utils::logging;
use crate::workflow::EvaluationFlow;
use anyhow::{bail, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: EvaluationFlow,
    writer: Arc<ReportWriter>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        if config.max_concurrent_submissions == 0 {
            bail!("MAX_CONCURRENT_SUBMISSIONS 必须大于 0");
        }

        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(config.max_concurrent_submissions, &config.grading_model);

        if !config.has_llm_credentials() {
            warn!("⚠️ 未配置 LLM_API_KEY，阅卷请求将会失败");
        }

        Ok(Self {
            flow: EvaluationFlow::new(&config),
            writer: Arc::new(ReportWriter::with_path(&config.output_log_file)),
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let submissions = self.load_submissions().await?;

        if submissions.is_empty() {
            warn!("⚠️ 没有找到待批改的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_submissions_loaded(submissions.len(), self.config.max_concurrent_submissions);

        let stats = self.process_all(submissions).await?;

        logging::print_final_stats(
            stats.success,
            stats.unstructured,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    async fn load_submissions(&self) -> Result<Vec<Submission>> {
        info!("\n📁 正在扫描待批改的答卷...");
        crate::models::load_all_submissions(&self.config.submissions_folder).await
    }

    /// 分批处理所有答卷
    async fn process_all(&self, submissions: Vec<Submission>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_submissions;
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = submissions.len();
        let total_batches = total.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        for (batch_index, batch) in submissions.chunks(batch_size).enumerate() {
            let batch_start = batch_index * batch_size;
            let batch_num = batch_index + 1;

            logging::log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            let result = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            stats.success += result.success;
            stats.unstructured += result.unstructured;
            stats.failed += result.failed;

            logging::log_batch_complete(batch_num, result.success, result.total());
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[Submission],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut handles = Vec::new();

        for (idx, submission) in batch.iter().enumerate() {
            let submission_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let flow = self.flow.clone();
            let writer = self.writer.clone();
            let submission = submission.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                submission_processor::process_submission(
                    &flow,
                    &writer,
                    &submission,
                    submission_index,
                )
                .await
                .inspect_err(|e| {
                    error!("[答卷 {}] ❌ 处理过程中发生错误: {:#}", submission_index, e);
                })
            });
            handles.push((submission_index, handle));
        }

        let mut result = BatchResult::default();

        for (submission_index, handle) in handles {
            match handle.await {
                Ok(Ok(structured)) => result.record(Some(structured)),
                Ok(Err(_)) => result.record(None),
                Err(e) => {
                    error!("[答卷 {}] 任务执行失败: {}", submission_index, e);
                    result.record(None);
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    /// 已写入报告且识别出题目
    pub success: usize,
    /// 已写入报告，但阅卷文本中没有可识别的题目
    pub unstructured: usize,
    /// 阅卷或写报告失败
    pub failed: usize,
    pub total: usize,
}

/// 批次处理结果
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchResult {
    success: usize,
    unstructured: usize,
    failed: usize,
}

impl BatchResult {
    /// 记录一份答卷的结果：`Some(是否结构化)` 表示已写入报告，`None` 表示失败
    fn record(&mut self, outcome: Option<bool>) {
        match outcome {
            Some(true) => self.success += 1,
            Some(false) => self.unstructured += 1,
            None => self.failed += 1,
        }
    }

    fn total(&self) -> usize {
        self.success + self.unstructured + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            submissions_folder: dir.join("submissions").to_string_lossy().to_string(),
            output_log_file: dir.join("report.txt").to_string_lossy().to_string(),
            max_concurrent_submissions: 2,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            max_concurrent_submissions: 0,
            ..config_in(dir.path())
        };
        assert!(App::initialize(config).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_folder_finishes_without_work() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::create_dir(&config.submissions_folder).unwrap();

        let app = App::initialize(config.clone()).await.unwrap();
        let stats = app.run().await.unwrap();
        assert_eq!(stats, ProcessingStats::default());

        let report = std::fs::read_to_string(&config.output_log_file).unwrap();
        assert!(report.contains("阅卷报告"));
    }

    #[tokio::test]
    async fn test_failed_submissions_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::create_dir(&config.submissions_folder).unwrap();
        for name in ["a", "b", "c"] {
            std::fs::write(
                dir.path().join("submissions").join(format!("{}.toml", name)),
                format!(
                    "name = \"{}\"\n[question_paper]\ntext = \"Q\"\n[answer_key]\ntext = \"K\"\n[student_answers]\ntext = \"A\"\n",
                    name
                ),
            )
            .unwrap();
        }

        // 未配置密钥，每份答卷都在阅卷步骤失败
        let app = App::initialize(config).await.unwrap();
        let stats = app.run().await.unwrap();
        assert_eq!(
            stats,
            ProcessingStats {
                success: 0,
                unstructured: 0,
                failed: 3,
                total: 3
            }
        );
    }

    #[test]
    fn test_unstructured_reports_are_not_failures() {
        let mut result = BatchResult::default();
        result.record(Some(true));
        result.record(Some(false));
        result.record(Some(false));
        result.record(None);

        assert_eq!(
            result,
            BatchResult {
                success: 1,
                unstructured: 2,
                failed: 1
            }
        );
        assert_eq!(result.total(), 4);
    }
}
