pub mod evaluation;
pub mod loaders;
pub mod progress;
pub mod session;
pub mod submission;

pub use evaluation::{EvaluationReport, EvaluationSummary, QuestionRecord, ScorePair};
pub use loaders::{load_all_submissions, load_submission};
pub use progress::{Achievement, UserProgress};
pub use session::{ChatMessage, Role, SessionType, StudySession};
pub use submission::{mime_from_path, Source, Submission};
