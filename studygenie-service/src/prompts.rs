//! Prompt templates and token budgets for each study task.

/// One generation call made by a study endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyTask {
    Explain,
    FlashcardQuestion,
    FlashcardAnswer,
    Summarize,
    ExamTips,
    Quiz,
}

impl StudyTask {
    /// Substitute `input` into the task template. `input` is used verbatim.
    pub fn prompt(self, input: &str) -> String {
        match self {
            StudyTask::Explain => format!(
                "Explain {input} in simple student-friendly language with examples. \
                 Write at least 30 sentences."
            ),
            StudyTask::FlashcardQuestion => {
                format!("Create one important question for revision on {input}.")
            }
            StudyTask::FlashcardAnswer => {
                format!("Answer the question about {input} in detail with at least 30 sentences.")
            }
            StudyTask::Summarize => format!(
                "Summarize the following notes into clear bullet points with explanations:\n{input}"
            ),
            StudyTask::ExamTips => format!(
                "Generate exam tips, key points, important facts, and formulas for {input}. \
                 Write at least 30 sentences."
            ),
            StudyTask::Quiz => format!(
                "Generate 5 multiple choice questions on {input} with 4 options and show the correct answer."
            ),
        }
    }

    pub fn max_new_tokens(self) -> u32 {
        match self {
            StudyTask::FlashcardQuestion => 60,
            StudyTask::Summarize => 250,
            StudyTask::Explain
            | StudyTask::FlashcardAnswer
            | StudyTask::ExamTips
            | StudyTask::Quiz => 300,
        }
    }
}
