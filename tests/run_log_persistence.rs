use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sgoop::{RunLog, SgoopConfig, SgoopSession, TrajectoryLoader};

fn temp_path(name: &str) -> PathBuf {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("sgoop_{}_{}.json", name, epoch));
    path
}

fn small_session() -> SgoopSession {
    let table = "\
# t  x  y
0.0 0.1
0.4 0.3
1.1 0.2
1.6 0.9
2.2 1.0
1.7 1.4
1.0 1.1
0.5 0.6
";
    let trajectory = TrajectoryLoader::from_table_str(table).expect("trajectory");
    let config = SgoopConfig {
        bins: 4,
        wells: 1,
        ..SgoopConfig::default()
    };
    SgoopSession::new(config, trajectory).expect("session")
}

#[test]
fn run_log_survives_json_dump() {
    let mut session = small_session();
    session.rc_eval(&[1.0, 0.0]).expect("score x");
    session.rc_eval(&[1.0, 1.0]).expect("score diagonal");

    let path = temp_path("run_log");
    session.run_log().write_json(&path).expect("write run log");
    let restored = RunLog::read_json(&path).expect("read run log");

    assert_eq!(restored.len(), 2);
    assert_eq!(restored.scores(), session.run_log().scores());
    assert_eq!(restored.rcs(), session.run_log().rcs());
    assert_eq!(restored.eigenvectors()[1].len(), 4);

    let _ = fs::remove_file(path);
}

#[test]
fn trajectory_loads_from_disk() {
    let path = temp_path("trajectory");
    fs::write(&path, "1.0 2.0 3.0\n4.0 5.0 6.0\n").expect("write trajectory");
    let trajectory = TrajectoryLoader::from_path(&path).expect("load trajectory");
    assert_eq!(trajectory.frame_count(), 2);
    assert_eq!(trajectory.dimension(), 3);
    let _ = fs::remove_file(path);
}

#[test]
fn missing_trajectory_is_an_io_error() {
    let path = temp_path("missing");
    let err = TrajectoryLoader::from_path(&path).unwrap_err();
    assert!(matches!(err, sgoop::SgoopError::Io(_)));
}
