use serde::{Deserialize, Serialize};

use crate::helpers::format_date_long;
use crate::user::UserId;

pub type ProjectId = i64;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl Project {
    /// `"Start: ...  End: ..."`, leaving out whichever date is unset.
    pub fn date_range(&self) -> Option<String> {
        let parts: Vec<String> = [("Start", &self.start_date), ("End", &self.end_date)]
            .into_iter()
            .filter_map(|(label, date)| {
                let date = date.as_deref().filter(|d| !d.trim().is_empty())?;
                Some(format!("{label}: {}", format_date_long(Some(date))))
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join("  "))
    }
}

/// Body of `POST /projects`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_project_sends_null_dates() {
        let body = serde_json::to_value(NewProject {
            title: "Launch".into(),
            description: String::new(),
            start_date: None,
            end_date: Some("2024-06-30".into()),
            user_id: 4,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "title": "Launch",
                "description": "",
                "startDate": null,
                "endDate": "2024-06-30",
                "userId": 4
            })
        );
    }

    #[test]
    fn project_without_user_id_decodes() {
        let project: Project =
            serde_json::from_value(json!({ "id": 2, "title": "Home", "startDate": "2024-01-01" }))
                .unwrap();
        assert_eq!(project.user_id, None);
        assert_eq!(project.start_date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn date_range_skips_unset_dates() {
        let mut p: Project = serde_json::from_value(json!({"id": 1, "title": "Home"})).unwrap();
        assert_eq!(p.date_range(), None);
        p.end_date = Some("2024-03-01".into());
        assert_eq!(p.date_range().as_deref(), Some("End: Friday, March 1, 2024"));
        p.start_date = Some("2024-02-01".into());
        assert_eq!(
            p.date_range().as_deref(),
            Some("Start: Thursday, February 1, 2024  End: Friday, March 1, 2024")
        );
    }
}
