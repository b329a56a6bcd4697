//! Sequential driver for the create → estimate → provision → normalize →
//! notify pipeline.
//!
//! Issue specs are processed one at a time, in configuration order. A step
//! failure abandons the remaining steps of that spec only; the run carries on
//! with the next spec and the outcome lands in the final report. Nothing is
//! rolled back — a created ticket or provisioned folder stays put even when a
//! later step fails.

use std::path::PathBuf;

use tracing::info;

use crate::client::IssueService;
use crate::errors::StepError;
use crate::normalize::normalize;
use crate::notify::Notifier;
use crate::provision::provision;
use crate::settings::{IssueSpec, Settings};

/// What happened to one issue spec.
#[derive(Debug)]
pub enum SpecOutcome {
    Completed {
        title: String,
        iid: i64,
        folder: PathBuf,
    },
    Failed {
        title: String,
        error: StepError,
    },
}

/// Per-spec outcomes for a whole run, in configuration order.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<SpecOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SpecOutcome::Completed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

pub struct Orchestrator<'a, S: IssueService, N: Notifier> {
    settings: &'a Settings,
    service: S,
    notifier: N,
}

impl<'a, S: IssueService, N: Notifier> Orchestrator<'a, S, N> {
    pub fn new(settings: &'a Settings, service: S, notifier: N) -> Self {
        Self {
            settings,
            service,
            notifier,
        }
    }

    /// Process every configured issue spec sequentially.
    pub async fn run(&self) -> RunReport {
        let mut outcomes = Vec::with_capacity(self.settings.issues.len());
        for spec in &self.settings.issues {
            let outcome = match self.process_spec(spec).await {
                Ok((iid, folder)) => {
                    info!(title = %spec.title, iid, "issue spec completed");
                    SpecOutcome::Completed {
                        title: spec.title.clone(),
                        iid,
                        folder,
                    }
                }
                Err(error) => {
                    info!(title = %spec.title, %error, "issue spec failed");
                    SpecOutcome::Failed {
                        title: spec.title.clone(),
                        error,
                    }
                }
            };
            outcomes.push(outcome);
        }
        RunReport { outcomes }
    }

    async fn process_spec(&self, spec: &IssueSpec) -> Result<(i64, PathBuf), StepError> {
        let created = self
            .service
            .create_issue(&spec.title, &spec.labels)
            .await
            .map_err(StepError::CreateIssue)?;

        self.service
            .set_time_estimate(created.iid, spec.estimate_hours)
            .await
            .map_err(StepError::SetEstimate)?;

        let folder = provision(
            &self.settings.folders.template_dir,
            &self.settings.folders.destination_root,
            created.iid,
        )?;

        normalize(&folder, created.iid);

        self.notifier.notify(created.iid, &folder)?;

        Ok((created.iid, folder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CreatedIssue;
    use crate::errors::{NotificationError, ServiceError};
    use crate::settings::{
        ContentSettings, FolderSettings, NotificationSettings, ServiceSettings,
    };
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records calls; hands out ids in order; optionally fails chosen calls.
    #[derive(Default)]
    struct StubService {
        next_iid: Mutex<i64>,
        fail_create_for: Option<String>,
        fail_estimate: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl IssueService for StubService {
        async fn create_issue(
            &self,
            title: &str,
            labels: &[String],
        ) -> Result<CreatedIssue, ServiceError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("create {title} [{}]", labels.join(",")));
            if self.fail_create_for.as_deref() == Some(title) {
                return Err(ServiceError::Status {
                    status: reqwest::StatusCode::BAD_GATEWAY,
                    body: "bad gateway".into(),
                });
            }
            let mut iid = self.next_iid.lock().unwrap();
            *iid += 1;
            Ok(CreatedIssue { iid: 100 + *iid })
        }

        async fn set_time_estimate(&self, iid: i64, hours: u32) -> Result<(), ServiceError> {
            if hours == 0 {
                return Ok(());
            }
            self.calls
                .lock()
                .unwrap()
                .push(format!("estimate {iid} {hours}h"));
            if self.fail_estimate {
                return Err(ServiceError::Status {
                    status: reqwest::StatusCode::BAD_REQUEST,
                    body: "invalid duration".into(),
                });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notified: Mutex<Vec<(i64, PathBuf)>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, iid: i64, folder: &Path) -> Result<(), NotificationError> {
            if self.fail {
                return Err(NotificationError::Display("no display server".into()));
            }
            self.notified
                .lock()
                .unwrap()
                .push((iid, folder.to_path_buf()));
            Ok(())
        }
    }

    fn settings_with(dir: &TempDir, issues: Vec<IssueSpec>) -> Settings {
        let template = dir.path().join("template");
        std::fs::create_dir_all(&template).unwrap();
        std::fs::write(template.join("issue-template.md"), "# Template").unwrap();
        Settings {
            service: ServiceSettings {
                base_url: "https://gitlab.example.com".into(),
                project_id: 42,
                token: Some("glpat-test".into()),
            },
            content: ContentSettings {
                description_file: dir.path().join("description.md"),
            },
            folders: FolderSettings {
                template_dir: template,
                destination_root: dir.path().join("work"),
            },
            notifications: NotificationSettings::default(),
            issues,
        }
    }

    fn spec(title: &str, labels: &[&str], estimate_hours: u32) -> IssueSpec {
        IssueSpec {
            title: title.into(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            estimate_hours,
        }
    }

    #[tokio::test]
    async fn test_single_spec_runs_the_whole_pipeline() {
        let dir = TempDir::new().unwrap();
        let settings = settings_with(&dir, vec![spec("X", &["Backend"], 10)]);
        let service = StubService::default();
        let notifier = RecordingNotifier::default();

        let orchestrator = Orchestrator::new(&settings, service, notifier);
        let report = orchestrator.run().await;

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 0);

        let calls = orchestrator.service.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec!["create X [Backend]", "estimate 101 10h"]
        );

        // Folder provisioned under the returned iid and renamed.
        let folder = dir.path().join("work/101");
        assert!(folder.join("Issue-101template.md").exists());
        assert!(!folder.join("issue-template.md").exists());

        let notified = orchestrator.notifier.notified.lock().unwrap().clone();
        assert_eq!(notified, vec![(101, folder)]);
    }

    #[tokio::test]
    async fn test_zero_estimate_skips_the_estimate_call() {
        let dir = TempDir::new().unwrap();
        let settings = settings_with(&dir, vec![spec("X", &[], 0)]);
        let orchestrator =
            Orchestrator::new(&settings, StubService::default(), RecordingNotifier::default());
        let report = orchestrator.run().await;

        assert_eq!(report.succeeded(), 1);
        let calls = orchestrator.service.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["create X []"]);
    }

    #[tokio::test]
    async fn test_failed_create_does_not_stop_later_specs() {
        let dir = TempDir::new().unwrap();
        let settings = settings_with(&dir, vec![spec("bad", &[], 0), spec("good", &[], 0)]);
        let service = StubService {
            fail_create_for: Some("bad".into()),
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(&settings, service, RecordingNotifier::default());
        let report = orchestrator.run().await;

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcomes[0],
            SpecOutcome::Failed {
                error: StepError::CreateIssue(_),
                ..
            }
        ));
        assert!(matches!(report.outcomes[1], SpecOutcome::Completed { .. }));

        // The failed spec consumed no id and provisioned nothing; the good
        // spec got the first id.
        assert!(dir.path().join("work/101").exists());
        assert!(!dir.path().join("work/102").exists());
    }

    #[tokio::test]
    async fn test_failed_estimate_aborts_that_spec_before_provisioning() {
        let dir = TempDir::new().unwrap();
        let settings = settings_with(&dir, vec![spec("X", &[], 5)]);
        let service = StubService {
            fail_estimate: true,
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(&settings, service, RecordingNotifier::default());
        let report = orchestrator.run().await;

        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcomes[0],
            SpecOutcome::Failed {
                error: StepError::SetEstimate(_),
                ..
            }
        ));
        assert!(!dir.path().join("work/101").exists());
    }

    #[tokio::test]
    async fn test_failed_notification_is_reported_but_folder_remains() {
        let dir = TempDir::new().unwrap();
        let settings = settings_with(&dir, vec![spec("X", &[], 0)]);
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(&settings, StubService::default(), notifier);
        let report = orchestrator.run().await;

        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcomes[0],
            SpecOutcome::Failed {
                error: StepError::Notify(_),
                ..
            }
        ));
        // No rollback: the provisioned folder stays.
        assert!(dir.path().join("work/101/Issue-101template.md").exists());
    }

    #[tokio::test]
    async fn test_missing_template_fails_at_provision_step() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_with(&dir, vec![spec("X", &[], 0)]);
        settings.folders.template_dir = dir.path().join("nonexistent");

        let orchestrator =
            Orchestrator::new(&settings, StubService::default(), RecordingNotifier::default());
        let report = orchestrator.run().await;

        assert!(matches!(
            report.outcomes[0],
            SpecOutcome::Failed {
                error: StepError::Provision(_),
                ..
            }
        ));
    }
}
