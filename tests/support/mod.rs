//! テスト用の偽Redmineと画像生成

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Cursor;
use welding_report::error::{ReportError, Result};
use welding_report::redmine::{IssueQuery, IssueSource, PhotoDownloader};
use welding_report_common::aggregate::field_names;
use welding_report_common::redmine::{Attachment, IdName, Issue, Project, User};
use welding_report_common::CustomField;

/// メモリ上のRedmine
#[derive(Default)]
pub struct FakeRedmine {
    pub issues: HashMap<u32, Issue>,
    pub children: HashMap<u32, Vec<Issue>>,
    pub project: Option<Project>,
    /// `project_issues` が返すチケット（問い合わせ内容に関係なく）
    pub listed: Vec<Issue>,
    pub user: User,
    pub queries: RefCell<Vec<IssueQuery>>,
}

impl FakeRedmine {
    pub fn with_act(mut self, parent: Issue, children: Vec<Issue>) -> Self {
        self.children.insert(parent.id, children);
        self.listed.push(parent.clone());
        self.issues.insert(parent.id, parent);
        self
    }
}

impl IssueSource for FakeRedmine {
    async fn issue(&self, id: u32) -> Result<Issue> {
        self.issues
            .get(&id)
            .cloned()
            .ok_or_else(|| ReportError::NotFound(format!("#{}", id)))
    }

    async fn child_issues(&self, _project: &str, parent_id: u32) -> Result<Vec<Issue>> {
        Ok(self.children.get(&parent_id).cloned().unwrap_or_default())
    }

    async fn project(&self, _identifier: &str) -> Result<Option<Project>> {
        Ok(self.project.clone())
    }

    async fn project_issues(&self, _identifier: &str, query: &IssueQuery) -> Result<Vec<Issue>> {
        self.queries.borrow_mut().push(query.clone());
        Ok(self.listed.clone())
    }

    async fn current_user(&self) -> Result<User> {
        Ok(self.user.clone())
    }
}

/// URLごとの画像を返すダウンローダー（未登録のURLは404扱い）
#[derive(Default)]
pub struct FakeDownloader {
    pub photos: HashMap<String, Vec<u8>>,
    pub calls: Cell<usize>,
}

impl FakeDownloader {
    pub fn with_photo(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.photos.insert(url.to_string(), bytes);
        self
    }
}

impl PhotoDownloader for FakeDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.set(self.calls.get() + 1);
        self.photos
            .get(url)
            .cloned()
            .ok_or_else(|| ReportError::Transport(format!("404 Not Found {}", url)))
    }
}

/// 単色のPNG
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([120, 90, 60])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).expect("PNG生成に失敗");
    buf.into_inner()
}

pub fn act(id: u32, report_number: &str, joints_plan: &str) -> Issue {
    Issue {
        id,
        subject: report_number.to_string(),
        tracker: Some(IdName { id: 1, name: "Акт".into() }),
        custom_fields: vec![
            CustomField::new(1, field_names::JOINTS_COUNT, json!(joints_plan)),
            CustomField::new(2, field_names::INCHES_PLAN, json!("40")),
            CustomField::new(3, field_names::INCHES_FACT, json!("20")),
        ],
        ..Default::default()
    }
}

pub fn child(id: u32, pipeline: &str, photos: &[(&str, &str, &str)]) -> Issue {
    Issue {
        id,
        subject: format!("Стык {}", id),
        custom_fields: vec![
            CustomField::new(10, field_names::JOINTS_COUNT, json!("2")),
            CustomField::new(11, field_names::OUTER_DIAMETER, json!("219.1")),
            CustomField::new(12, field_names::INCHES_FACT, json!("8.625")),
            CustomField::new(13, field_names::ACT_PARAGRAPH, json!("1")),
            CustomField::new(14, field_names::EQUIPMENT_TYPE, json!("Трубопровод")),
            CustomField::new(15, field_names::PIPELINE_NUMBER, json!(pipeline)),
        ],
        attachments: photos
            .iter()
            .enumerate()
            .map(|(i, (contractor, joints, url))| Attachment {
                id: i as i64 + 1,
                filename: format!("{}.jpg", i + 1),
                description: Some(json!({"Contractor": contractor, "MarkedJoints": joints}).to_string()),
                content_url: url.to_string(),
            })
            .collect(),
        ..Default::default()
    }
}
