//! Compile user selections into schedule requests.
//!
//! A [`RequestConfiguration`] is plain data built by the front end. The
//! compiler resolves it against a [`MetadataSnapshot`] and expands it into
//! one [`PlanRequest`] per matching source URL.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ScheduleError, ScheduleResult};
use crate::metadata::MetadataSnapshot;

/// One (program, semester, group, modules) selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestConfiguration {
    #[serde(default)]
    pub program: Option<String>,

    #[serde(default)]
    pub semester: Option<u32>,

    #[serde(default)]
    pub group: Option<String>,

    #[serde(default)]
    pub modules: Vec<String>,
}

/// Body entry for `POST {base}/schedule_scraper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub url: String,
    pub label: String,
    pub filter: Vec<String>,
}

/// Plan file layout: a list of `[[plan]]` tables.
#[derive(Debug, Default, Deserialize)]
pub struct PlanFile {
    #[serde(default, rename = "plan")]
    pub plans: Vec<RequestConfiguration>,
}

impl PlanFile {
    pub fn load(path: &std::path::Path) -> ScheduleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl RequestConfiguration {
    pub fn new(program: impl Into<String>, semester: u32) -> Self {
        RequestConfiguration {
            program: Some(program.into()),
            semester: Some(semester),
            group: None,
            modules: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for module in modules {
            self.add_module(module);
        }
        self
    }

    /// Add a module abbreviation; duplicates and blanks are ignored.
    pub fn add_module(&mut self, module: impl Into<String>) {
        let module = module.into().trim().to_string();
        if !module.is_empty() && !self.modules.contains(&module) {
            self.modules.push(module);
        }
    }

    /// Program, semester and at least one module must be set.
    pub fn is_eligible(&self) -> bool {
        self.program.as_deref().is_some_and(|p| !p.is_empty())
            && self.semester.is_some()
            && !self.modules.is_empty()
    }

    fn group(&self) -> Option<&str> {
        self.group.as_deref().filter(|g| !g.is_empty())
    }
}

impl FromStr for RequestConfiguration {
    type Err = String;

    /// Parse `PROGRAM:SEMESTER[:GROUP]:MOD1,MOD2,...`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();

        let (program, semester, group, modules) = match parts.as_slice() {
            [program, semester, modules] => (*program, *semester, None, *modules),
            [program, semester, group, modules] => (*program, *semester, Some(*group), *modules),
            _ => {
                return Err(format!(
                    "Invalid plan '{}'. Expected PROGRAM:SEMESTER[:GROUP]:MODULE,MODULE",
                    s
                ));
            }
        };

        if program.is_empty() {
            return Err(format!("Invalid plan '{}': program is empty", s));
        }

        let semester: u32 = semester
            .parse()
            .map_err(|_| format!("Invalid semester '{}' in plan '{}'", semester, s))?;

        let mut config = RequestConfiguration::new(program, semester)
            .with_modules(modules.split(',').filter(|m| !m.trim().is_empty()));
        if let Some(group) = group.filter(|g| !g.is_empty()) {
            config = config.with_group(group);
        }

        if config.modules.is_empty() {
            return Err(format!("Plan '{}' selects no modules", s));
        }

        Ok(config)
    }
}

/// Expand configurations into fetch requests.
///
/// Configurations that are incomplete, reference unknown programs/semesters
/// or match no source URL contribute nothing. An empty result is
/// [`ScheduleError::NoValidConfigurations`].
pub fn compile_requests(
    snapshot: &MetadataSnapshot,
    configs: &[RequestConfiguration],
) -> ScheduleResult<Vec<PlanRequest>> {
    let mut plans = Vec::new();

    for (i, config) in configs.iter().enumerate() {
        let n = i + 1;

        if !config.is_eligible() {
            warn!(configuration = n, "skipping incomplete configuration");
            continue;
        }

        let (Some(program_name), Some(semester_index)) = (config.program.as_deref(), config.semester)
        else {
            continue;
        };

        let Some(program) = snapshot.program(program_name) else {
            warn!(configuration = n, program = program_name, "program not found in metadata");
            continue;
        };

        let Some(semester) = program.semester(semester_index) else {
            warn!(
                configuration = n,
                program = program_name,
                semester = semester_index,
                "semester not found in metadata"
            );
            continue;
        };

        let group = config.group();
        let label = match group {
            Some(group) => format!("{} {} Gr. {}", program.label(), semester.name, group),
            None => format!("{} {}", program.label(), semester.name),
        };

        let before = plans.len();
        plans.extend(semester.urls_for_group(group).map(|source| PlanRequest {
            url: source.url.clone(),
            label: label.clone(),
            filter: config.modules.clone(),
        }));

        if plans.len() == before {
            warn!(configuration = n, label = %label, "no source URLs match configuration");
        } else {
            debug!(configuration = n, label = %label, count = plans.len() - before, "compiled plans");
        }
    }

    if plans.is_empty() {
        return Err(ScheduleError::NoValidConfigurations);
    }

    Ok(plans)
}
