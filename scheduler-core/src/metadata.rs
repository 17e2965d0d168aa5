//! Curriculum metadata served by `GET {base}/course_scraper`.
//!
//! The snapshot is read-only input for the request compiler and for listing
//! the programs, semesters, groups and modules a user can choose from.

use serde::{Deserialize, Serialize};

use crate::de;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    /// When the server last scraped the curriculum (free-form label)
    #[serde(rename = "abgerufen", default)]
    pub fetched_at: Option<String>,

    #[serde(default)]
    pub semester_info: SemesterInfo,

    #[serde(rename = "studiengaenge", default)]
    pub programs: Vec<Program>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemesterInfo {
    #[serde(rename = "aktuelles_semester", default)]
    pub current_semester: Option<String>,

    #[serde(rename = "zeitraum", default)]
    pub period: Option<String>,
}

/// A study program (Studiengang)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,

    #[serde(rename = "vollername", default)]
    pub display_name: String,

    #[serde(rename = "semester", default)]
    pub semesters: Vec<Semester>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    #[serde(rename = "zahl", deserialize_with = "de::u32_from_string_or_number")]
    pub index: u32,

    /// Display name, e.g. "2. Semester"
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub urls: Vec<SourceUrl>,

    #[serde(rename = "module", default)]
    pub modules: Vec<Module>,
}

/// One published schedule endpoint for a program, semester and (optionally) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUrl {
    pub url: String,

    #[serde(
        rename = "gruppe",
        default,
        deserialize_with = "de::opt_non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(rename = "abk")]
    pub abbreviation: String,

    #[serde(default)]
    pub name: String,
}

impl MetadataSnapshot {
    pub fn program(&self, name: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.name == name)
    }
}

impl Program {
    pub fn semester(&self, index: u32) -> Option<&Semester> {
        self.semesters.iter().find(|s| s.index == index)
    }

    /// Display name, falling back to the short name when the server sent none.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

impl Semester {
    /// Distinct group labels in the order they first appear.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for group in self.urls.iter().filter_map(|u| u.group.as_deref()) {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups
    }

    pub fn has_groups(&self) -> bool {
        self.urls.iter().any(|u| u.group.is_some())
    }

    pub fn module(&self, abbreviation: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.abbreviation == abbreviation)
    }

    /// Source URLs matching `group`, or all of them when no group is given.
    pub fn urls_for_group<'a>(
        &'a self,
        group: Option<&'a str>,
    ) -> impl Iterator<Item = &'a SourceUrl> + 'a {
        self.urls
            .iter()
            .filter(move |u| group.is_none() || u.group.as_deref() == group)
    }
}
