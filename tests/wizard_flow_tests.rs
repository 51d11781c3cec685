use std::io::Cursor;
use std::sync::Arc;

use loan_wizard::cli::{demo, run_scripted};
use loan_wizard::errors::CliError;
use sacco_core::{
    ApiCall, ApiError, InMemoryLoanApi, PhaseRetry, RecordingNotifier, SessionOptions,
    StaticProfileSource, SubmissionState, WizardSession,
};
use sacco_domain::{ApplicantType, Guarantor};

fn session(
    api: Arc<InMemoryLoanApi>,
    notifier: Arc<RecordingNotifier>,
    profile: StaticProfileSource,
) -> WizardSession {
    WizardSession::new(
        api,
        Arc::new(profile),
        notifier,
        SessionOptions {
            applicant_type: ApplicantType::Member,
            retry: PhaseRetry::ResendAll,
        },
    )
}

fn script(lines: &[&str]) -> Cursor<String> {
    Cursor::new(lines.join("\n") + "\n")
}

/// Biashara Loan, valid details accepting every prefilled default.
const DETAILS: [&str; 13] = [
    "2", "1", "50000", "180", "", "", "Stock", "", "", "", "", "", "",
];

const GUARANTOR: [&str; 6] = ["add", "Otieno", "Colleague", "0722000111", "12345678", "20000"];

const NEXT_OF_KIN: [&str; 6] = ["add", "Akinyi", "Sister", "0733000222", "", "Kisumu"];

#[tokio::test]
async fn guarantor_and_next_of_kin_flow_reaches_review() {
    let api = Arc::new(demo::api());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut wizard = session(api.clone(), notifier.clone(), demo::profile_source());

    let mut lines: Vec<&str> = DETAILS.to_vec();
    lines.extend(GUARANTOR);
    lines.push("save");
    lines.extend(NEXT_OF_KIN);
    lines.extend(["save", "exit"]);
    run_scripted(&mut wizard, script(&lines)).await.unwrap();

    assert_eq!(wizard.state(), SubmissionState::Review);
    assert!(notifier.errors().is_empty());

    let applications = api.applications();
    assert_eq!(applications.len(), 1);
    let (id, request) = &applications[0];
    assert_eq!(request.owner_id, "demo-user");
    assert_eq!(request.member_id.as_deref(), Some("M-00042"));
    assert_eq!(request.occupation, "Teacher");
    let saved = wizard.items::<Guarantor>().items().to_vec();
    assert_eq!(saved.len(), 1);
    assert_eq!(api.guarantors(), vec![(*id, saved[0].clone())]);
    assert_eq!(api.next_of_kin().len(), 1);
    assert_eq!(api.next_of_kin()[0].1.email, None);
}

#[tokio::test]
async fn failed_guarantor_can_be_retried_from_the_same_step() {
    let api = Arc::new(demo::api());
    api.fail_on(
        ApiCall::AddGuarantor,
        2,
        ApiError::Transport("connection reset".into()),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let mut wizard = session(api.clone(), notifier.clone(), demo::profile_source());

    let mut lines: Vec<&str> = DETAILS.to_vec();
    lines.extend(GUARANTOR);
    lines.extend(["add", "Mutua", "Neighbour", "0711000333", "23456789", "15000"]);
    lines.extend(["save", "save", "exit"]);
    run_scripted(&mut wizard, script(&lines)).await.unwrap();

    assert_eq!(notifier.errors().len(), 1);
    assert_eq!(wizard.state(), SubmissionState::CollectingGuarantors);
    // Resending everything duplicates the guarantor saved before the failure.
    assert_eq!(api.guarantors().len(), 3);
    assert_eq!(api.call_count(ApiCall::CreateApplication), 1);
}

#[tokio::test]
async fn anonymous_applicant_cannot_submit() {
    let api = Arc::new(demo::api());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut wizard = session(api.clone(), notifier.clone(), StaticProfileSource::anonymous());

    let lines = [
        "1",
        "1",
        "20000",
        "30",
        "0712345678",
        "Teacher",
        "School fees",
        "Wanjiku",
        "Kamau",
        "wanjiku@example.co.ke",
        "Nairobi",
        "",
        "",
        "exit",
    ];
    run_scripted(&mut wizard, script(&lines)).await.unwrap();

    assert_eq!(wizard.state(), SubmissionState::Drafting);
    assert_eq!(notifier.errors().len(), 1);
    assert_eq!(api.call_count(ApiCall::CreateApplication), 0);
}

#[tokio::test]
async fn running_out_of_input_is_reported() {
    let api = Arc::new(demo::api());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut wizard = session(api, notifier, demo::profile_source());

    let err = run_scripted(&mut wizard, script(&["1"])).await.unwrap_err();
    assert!(matches!(err, CliError::InputClosed));
}

#[tokio::test]
async fn malformed_date_of_birth_is_asked_again() {
    let api = Arc::new(demo::api());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut wizard = session(api.clone(), notifier, demo::profile_source());

    let mut lines: Vec<&str> = DETAILS[..11].to_vec();
    lines.extend(["31/12/1990", "1990-12-31", "", "exit"]);
    run_scripted(&mut wizard, script(&lines)).await.unwrap();

    assert_eq!(wizard.state(), SubmissionState::Submitted);
    assert_eq!(
        wizard.draft().applicant.date_of_birth,
        chrono::NaiveDate::from_ymd_opt(1990, 12, 31)
    );
}
