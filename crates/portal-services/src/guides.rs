//! Catalogue of the how-to guides.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guide {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub difficulty: Difficulty,
    pub estimated_time: &'static str,
    pub steps: u32,
}

const GUIDES: [Guide; 4] = [
    Guide {
        id: "sassa-srd-application",
        title: "SRD R350 Grant Application",
        description: "Complete step-by-step guide to applying for the Social Relief of Distress R350 grant",
        category: "sassa",
        difficulty: Difficulty::Easy,
        estimated_time: "15 minutes",
        steps: 7,
    },
    Guide {
        id: "id-application",
        title: "Smart ID Card Application",
        description: "How to apply for a South African Smart ID Card",
        category: "id",
        difficulty: Difficulty::Medium,
        estimated_time: "30 minutes",
        steps: 8,
    },
    Guide {
        id: "tax-return",
        title: "SARS Tax Return Filing",
        description: "Guide to filing your annual tax return with SARS",
        category: "tax",
        difficulty: Difficulty::Medium,
        estimated_time: "25 minutes",
        steps: 6,
    },
    Guide {
        id: "drivers-license",
        title: "Drivers License Renewal",
        description: "Complete process for renewing your South African drivers license",
        category: "license",
        difficulty: Difficulty::Medium,
        estimated_time: "20 minutes",
        steps: 5,
    },
];

pub fn all() -> &'static [Guide] {
    &GUIDES
}

pub fn find(id: &str) -> Option<&'static Guide> {
    GUIDES.iter().find(|g| g.id == id)
}

/// Body of `/api/guides/list`
#[derive(Debug, Clone, Serialize)]
pub struct GuideList {
    pub success: bool,
    pub guides: &'static [Guide],
    pub total: usize,
    pub timestamp: String,
}

impl GuideList {
    pub fn new(timestamp: String) -> Self {
        Self {
            success: true,
            guides: all(),
            total: GUIDES.len(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(find("tax-return").map(|g| g.steps), Some(6));
        assert!(find("passport").is_none());
    }

    #[test]
    fn test_list_payload() {
        let value = serde_json::to_value(GuideList::new("2026-10-19T09:00:00".into())).unwrap();
        assert_eq!(value["total"], 4);
        assert_eq!(value["guides"][0]["id"], "sassa-srd-application");
        assert_eq!(value["guides"][0]["difficulty"], "easy");
    }
}
