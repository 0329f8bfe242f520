use serde::Serialize;
use thiserror::Error;

use crate::host::HostError;

/// 单行回写失败原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateFailure {
    #[error("node not found or not text")]
    NotFoundOrNotText,

    #[error("inside symbol instance")]
    InsideInstance,

    #[error("font load error")]
    FontLoad(#[source] HostError),

    #[error("text update rejected")]
    SetText(#[source] HostError),

    #[error("text did not persist after update")]
    NotPersisted,
}

impl UpdateFailure {
    /// 附带宿主错误细节的完整描述
    pub fn detail(&self) -> String {
        match self {
            UpdateFailure::FontLoad(source) | UpdateFailure::SetText(source) => {
                format!("{}: {}", self, source)
            }
            _ => self.to_string(),
        }
    }
}

/// 单行回写结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    SkippedNoText,
    SkippedNoId,
    Failed(UpdateFailure),
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, UpdateOutcome::SkippedNoText | UpdateOutcome::SkippedNoId)
    }

    pub fn failure(&self) -> Option<&UpdateFailure> {
        match self {
            UpdateOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// 与输入行一一对应的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    /// 数据行号（从 1 开始）
    pub row: usize,
    pub id: Option<String>,
    pub outcome: UpdateOutcome,
}

/// 首个失败行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureNote {
    pub row: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// 回写汇总（展示层只需要这些信息）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub applied: usize,
    pub failed: usize,
    pub skipped: usize,
    pub first_failure: Option<FailureNote>,
}

impl ReconcileSummary {
    pub fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        let mut summary = Self::default();

        for row in outcomes {
            match &row.outcome {
                UpdateOutcome::Applied => summary.applied += 1,
                UpdateOutcome::SkippedNoText | UpdateOutcome::SkippedNoId => summary.skipped += 1,
                UpdateOutcome::Failed(failure) => {
                    summary.failed += 1;
                    if summary.first_failure.is_none() {
                        summary.first_failure = Some(FailureNote {
                            row: row.row,
                            id: row.id.clone(),
                            reason: failure.to_string(),
                        });
                    }
                }
            }
        }

        summary
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// 单条用户通知：计数 + 首个错误
    pub fn message(&self) -> String {
        let mut message = format!("Updated {} text layer(s)", self.applied);
        if self.failed > 0 {
            message.push_str(&format!(", {} failed", self.failed));
        }
        if self.skipped > 0 {
            message.push_str(&format!(", {} skipped", self.skipped));
        }
        message.push('.');

        if let Some(note) = &self.first_failure {
            message.push_str(&format!(" First error (row {}", note.row));
            if let Some(id) = &note.id {
                message.push_str(&format!(", id {}", id));
            }
            message.push_str(&format!("): {}", note.reason));
        }

        message
    }
}

impl std::fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// 完整回写报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub outcomes: Vec<RowOutcome>,
    pub summary: ReconcileSummary,
}

impl ReconcileReport {
    pub fn new(outcomes: Vec<RowOutcome>) -> Self {
        let summary = ReconcileSummary::from_outcomes(&outcomes);
        Self { outcomes, summary }
    }

    /// 仅结果列表（按输入顺序）
    pub fn outcome_list(&self) -> Vec<&UpdateOutcome> {
        self.outcomes.iter().map(|row| &row.outcome).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(row: usize, id: &str, outcome: UpdateOutcome) -> RowOutcome {
        RowOutcome { row, id: Some(id.to_string()), outcome }
    }

    #[test]
    fn test_summary_counts_and_first_failure() {
        let report = ReconcileReport::new(vec![
            row(1, "1:1", UpdateOutcome::Applied),
            row(2, "9:9", UpdateOutcome::Failed(UpdateFailure::NotFoundOrNotText)),
            row(3, "1:3", UpdateOutcome::Failed(UpdateFailure::InsideInstance)),
            RowOutcome { row: 4, id: None, outcome: UpdateOutcome::SkippedNoId },
        ]);

        let summary = &report.summary;
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.skipped, 1);
        assert!(summary.has_failures());

        let note = summary.first_failure.as_ref().unwrap();
        assert_eq!(note.row, 2);
        assert_eq!(note.reason, "node not found or not text");
        assert_eq!(
            summary.message(),
            "Updated 1 text layer(s), 2 failed, 1 skipped. First error (row 2, id 9:9): node not found or not text"
        );
    }

    #[test]
    fn test_all_applied_message() {
        let report = ReconcileReport::new(vec![row(1, "1:1", UpdateOutcome::Applied)]);
        assert!(!report.summary.has_failures());
        assert_eq!(report.summary.message(), "Updated 1 text layer(s).");
    }

    #[test]
    fn test_failure_detail_includes_host_error() {
        let failure = UpdateFailure::FontLoad(HostError::FontUnavailable("Inter Bold".to_string()));
        assert_eq!(failure.to_string(), "font load error");
        assert_eq!(failure.detail(), "font load error: font unavailable: Inter Bold");
    }
}
