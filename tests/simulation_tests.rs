use std::sync::Arc;

use classroom_lite::config::{parse_grade_spec, EngineConfig, SimulationConfig};
use classroom_lite::coursework::{AssignmentStatus, FixedGrade};
use classroom_lite::notify::{MemorySink, SinkObserver};
use classroom_lite::simulation::Simulation;
use classroom_lite::ClassroomError;
use tokio_util::sync::CancellationToken;

fn class_config() -> SimulationConfig {
    let mut config = SimulationConfig::new(EngineConfig::default())
        .with_student("Ada Lovelace", "ada@example.com")
        .with_student("Alan Turing", "alan@example.com")
        .with_student("Grace Hopper", "grace@example.com")
        .with_assignment("HW1")
        .with_assignment("HW2");
    config.work = vec!["HW1".to_string()];
    config
}

fn simulation(config: SimulationConfig, sink: Arc<MemorySink>) -> Simulation {
    let observer = Arc::new(SinkObserver::new(sink.clone()));
    match Simulation::new(config, observer, sink) {
        Ok(sim) => sim.with_grade_source(Arc::new(FixedGrade(80))),
        Err(e) => panic!("simulation should build: {}", e),
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_term() {
    let mut config = class_config();
    config.grades = vec![
        parse_grade_spec("Ada Lovelace:HW2:75").unwrap(),
        parse_grade_spec("Alan Turing:HW2:abc").unwrap(),
    ];
    config.remind = Some("HW2".to_string());

    let sink = Arc::new(MemorySink::new());
    let sim = simulation(config, sink.clone());
    let report = sim.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.students.len(), 3);
    assert!(report.outstanding.is_empty());

    let ada = &report.students[0];
    assert_eq!(ada.full_name, "Ada Lovelace");
    assert_eq!(ada.assignment("HW2").unwrap().grade, Some(75.0));
    assert_eq!(ada.assignment("HW1").unwrap().grade, Some(80.0));
    assert_eq!(ada.overall_grade, Some(77.5));

    // The non-numeric grade was skipped, so HW2 went through the reminder
    let alan = &report.students[1];
    assert_eq!(alan.assignment("HW2").unwrap().status, AssignmentStatus::Pass);
    assert_eq!(alan.overall_grade, Some(80.0));

    let average = report.class_average.unwrap();
    assert!((average - (77.5 + 80.0 + 80.0) / 3.0).abs() < 1e-9);

    let lines = sink.lines();
    assert_eq!(
        lines
            .iter()
            .filter(|l| l.ends_with("has been added to the classlist."))
            .count(),
        3
    );
    assert_eq!(
        lines.iter().filter(|l| l.contains("final reminder for HW2")).count(),
        2
    );
    assert!(!lines.iter().any(|l| l == "Observer → Ada Lovelace, final reminder for HW2."));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_student_in_grade_spec() {
    let mut config = class_config();
    config.grades = vec![parse_grade_spec("Nobody:HW1:50").unwrap()];

    let sim = simulation(config, Arc::new(MemorySink::new()));
    let err = sim.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ClassroomError::StudentNotFound(name) if name == "Nobody"));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_work() {
    let config = class_config();
    let sim = simulation(config, Arc::new(MemorySink::new()));

    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let report = sim.run(shutdown).await.unwrap();

    // Everyone was still working on HW1 when the run was interrupted
    assert_eq!(report.outstanding.len(), 3);
    for student in &report.students {
        assert_eq!(
            student.assignment("HW1").unwrap().status,
            AssignmentStatus::Working
        );
        assert_eq!(student.overall_grade, None);
    }

    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    let students = sim.class_list().students().await;
    assert_eq!(
        students[0].assignment_status("HW1").await,
        Some(AssignmentStatus::Working)
    );
}

#[test]
fn test_invalid_engine_config_is_rejected() {
    let config = SimulationConfig::new(EngineConfig::new(u64::MAX, 500));
    let result = Simulation::new(
        config,
        Arc::new(SinkObserver::default()),
        Arc::new(MemorySink::new()),
    );
    assert!(matches!(result, Err(ClassroomError::InvalidConfig(_))));
}
