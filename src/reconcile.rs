/// 回写模块
///
/// 把编辑后的表格行按节点 ID 应用回文档树，只替换已存在文本节点的文本内容。
///
/// # 处理顺序（每行）
/// 1. 缺 ID / 缺文本 → 跳过
/// 2. 解析节点；不存在或不是文本 → 失败
/// 3. 位于组件实例内 → 失败
/// 4. 加载字体 → 失败则记录
/// 5. 替换文本
///
/// 单行失败不会中断后续行；结果列表与输入行一一对应。
pub mod outcome;

pub use outcome::{
    FailureNote, ReconcileReport, ReconcileSummary, RowOutcome, UpdateFailure, UpdateOutcome,
};

use crate::asset::UpdateRequest;
use crate::config::{ReconcileOptions, VerifyPolicy};
use crate::host::{DocumentHost, HostError};
use crate::utils::{decode_line_breaks, is_instance_derived_id};

/// 回写器
pub struct Reconciler<'h, H: DocumentHost + ?Sized> {
    host: &'h mut H,
    options: ReconcileOptions,
}

impl<'h, H: DocumentHost + ?Sized> Reconciler<'h, H> {
    pub fn new(host: &'h mut H, options: ReconcileOptions) -> Self {
        Self { host, options }
    }

    /// 按输入顺序逐行应用
    pub async fn apply(&mut self, requests: &[UpdateRequest]) -> ReconcileReport {
        let mut outcomes = Vec::with_capacity(requests.len());

        for request in requests {
            let outcome = self.apply_one(request).await;
            match &outcome {
                UpdateOutcome::Applied => {
                    tracing::debug!(row = request.row, id = ?request.id, "文本已更新");
                }
                UpdateOutcome::Failed(failure) => {
                    tracing::warn!(row = request.row, id = ?request.id, reason = %failure.detail(), "回写失败");
                }
                skipped => {
                    tracing::debug!(row = request.row, outcome = ?skipped, "跳过");
                }
            }

            outcomes.push(RowOutcome {
                row: request.row,
                id: request.id.clone(),
                outcome,
            });
        }

        let report = ReconcileReport::new(outcomes);
        tracing::info!(
            applied = report.summary.applied,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            "回写完成"
        );
        report
    }

    async fn apply_one(&mut self, request: &UpdateRequest) -> UpdateOutcome {
        let Some(id) = request.id.as_deref() else {
            return UpdateOutcome::SkippedNoId;
        };
        let Some(new_text) = request.new_text.as_deref() else {
            return UpdateOutcome::SkippedNoText;
        };

        let fonts = {
            let document = self.host.document();
            let Some(index) = self.host.resolve_by_id(id) else {
                return UpdateOutcome::Failed(UpdateFailure::NotFoundOrNotText);
            };
            if !document.node(index).kind.is_text() {
                return UpdateOutcome::Failed(UpdateFailure::NotFoundOrNotText);
            }

            // 实例内文本即使属性不可读也按实例排除
            if is_instance_derived_id(id) || document.is_instance_descendant(index) {
                return UpdateOutcome::Failed(UpdateFailure::InsideInstance);
            }

            let Some(props) = document.text_props(index) else {
                return UpdateOutcome::Failed(UpdateFailure::NotFoundOrNotText);
            };
            props.fonts_to_load()
        };

        if fonts.is_empty() {
            return UpdateOutcome::Failed(UpdateFailure::FontLoad(HostError::FontUnavailable(format!(
                "no resolvable font on {}",
                id
            ))));
        }
        for font in &fonts {
            if let Err(e) = self.host.load_font(font).await {
                return UpdateOutcome::Failed(UpdateFailure::FontLoad(e));
            }
        }

        let text = decode_line_breaks(new_text, &self.options.line_break_token);
        if let Err(e) = self.host.set_text(id, &text) {
            return UpdateOutcome::Failed(UpdateFailure::SetText(e));
        }

        if self.options.verify == VerifyPolicy::ReadBack
            && self.host.text_of(id).as_deref() != Some(text.as_str())
        {
            return UpdateOutcome::Failed(UpdateFailure::NotPersisted);
        }

        UpdateOutcome::Applied
    }
}
