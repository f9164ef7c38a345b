//! Welding Report Common Library
//!
//! Redmineの溶接記録から報告書モデルを組み立て、シート計画を作る純粋な処理。
//! 通信・ファイル入出力はルートクレート側で行う。

pub mod aggregate;
pub mod custom_fields;
pub mod error;
pub mod export;
pub mod joint_label;
pub mod layout;
pub mod packer;
pub mod redmine;
pub mod supr;
pub mod types;

pub use aggregate::{build_issue_report, parse_attachment_tag, AttachmentTag};
pub use custom_fields::{CustomField, CustomFields};
pub use error::{Error, Result};
pub use export::sheet_plan::{CellStyle, CellValue, MergeRange, PlacedPicture, SheetPlan, TemplateSheet};
pub use export::supr_sheet::{build_supr_sheet, SignatureBlock, SuprSignatures};
pub use export::welding_sheet::WeldingSheetBuilder;
pub use joint_label::JointLabel;
pub use layout::ReportLayout;
pub use packer::{PhotoCursor, PhotoImage, PhotoPacker, Placement};
pub use supr::{build_supr_report, SuprGroupReportData, SuprItem};
pub use types::{IssueReportData, JointEntry, JointGroup, ProjectReportData};
