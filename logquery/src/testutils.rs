use crate::errors::ExecutionError;
use crate::executor::{LogExecutor, QuerySettings};
use crate::range::TimeRange;
use async_trait::async_trait;
use chrono::NaiveDate;
use identity::Endpoint;
use std::sync::Mutex;

pub fn endpoint() -> Endpoint {
    Endpoint::new(
        "proj-1",
        "tenant-1",
        "us-east-1",
        "br-1",
        "tl-1",
        "ep-cool-1",
    )
}

pub fn settings() -> QuerySettings {
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let range = TimeRange::new(
        day.and_hms_opt(10, 0, 0).unwrap(),
        day.and_hms_opt(11, 0, 0).unwrap(),
        1000,
    )
    .unwrap();
    QuerySettings::new(range)
}

/// Returns the same canned lines for every query and records the queries it ran.
pub struct FakeExecutor {
    lines: Vec<String>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeExecutor {
    pub fn returning(lines: &[&str]) -> Self {
        FakeExecutor {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        FakeExecutor {
            fail: true,
            ..FakeExecutor::returning(&[])
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogExecutor for FakeExecutor {
    async fn query(
        &self,
        query: &str,
        _settings: &QuerySettings,
    ) -> Result<Vec<String>, ExecutionError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(ExecutionError::EmptyCommand);
        }
        Ok(self.lines.clone())
    }
}
