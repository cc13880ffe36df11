use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use filetree_core::{Action, Folder, FolderId, Record, Workspace};

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    implementation: &'static str,
    workload: String,
    timestamp: String,
    name: String,
    total_actions: u64,
    duration_ms: f64,
    actions_per_sec: f64,
    extra: Extra,
    source_file: Option<String>,
}

#[derive(serde::Serialize)]
struct Extra {
    count: u64,
}

fn folder_id(n: u64) -> FolderId {
    FolderId::new(format!("{n:016x}"))
}

/// Build `count` folders (four per parent) with one record each, then drop the whole tree
/// with a single cascading delete.
fn run(count: u64) -> Workspace {
    let mut ws = Workspace::new();
    for i in 0..count {
        let parent = (i > 0).then(|| folder_id((i - 1) / 4));
        ws = ws
            .apply(Action::CreateFolder(Folder::new(folder_id(i), format!("folder {i}"), parent)))
            .expect("create folder");
        ws = ws
            .apply(Action::CreateRecord(Record::new(format!("r{i}"), format!("file {i}"), Some(folder_id(i)))))
            .expect("create record");
    }
    ws.apply(Action::DeleteFolder { id: folder_id(0) }).expect("cascade delete")
}

fn main() {
    let mut count: u64 = 200;
    let mut out_file: Option<PathBuf> = None;
    for arg in env::args().skip(1) {
        if let Some(val) = arg.strip_prefix("--count=") {
            count = val.parse().unwrap_or(count);
        } else if let Some(val) = arg.strip_prefix("--out=") {
            out_file = Some(PathBuf::from(val));
        }
    }

    let start = Instant::now();
    let ws = run(count);
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    assert!(ws.is_empty(), "cascade delete left items behind");

    let total_actions = count * 2 + 1;
    let output = Output {
        implementation: "filetree-core",
        workload: format!("create-cascade-{}", count),
        timestamp: chrono::Utc::now().to_rfc3339(),
        name: format!("create-cascade-{}", count),
        total_actions,
        duration_ms,
        actions_per_sec: if duration_ms > 0.0 {
            total_actions as f64 / duration_ms * 1000.0
        } else {
            f64::INFINITY
        },
        extra: Extra { count },
        source_file: out_file.as_ref().map(|p| p.display().to_string()),
    };

    let json = serde_json::to_string_pretty(&output).expect("serialize");
    if let Some(path) = out_file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdirs");
        }
        fs::write(&path, &json).expect("write output");
    }
    println!("{}", json);
}
