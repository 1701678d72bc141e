use std::path::{Path, PathBuf};

/// Writes a Thermo export with `rows` cycles; Time runs 0.1, 0.2, ... seconds.
pub fn write_thermo(dir: &Path, file: &str, label: &str, acquired: &str, channels: &[&str], rows: usize) -> PathBuf {
    let mut lines = vec![format!("{label} : {acquired}")];
    for idx in 1..13 {
        lines.push(format!("Meta{idx},value"));
    }
    lines.push(format!("Time,{},", channels.join(",")));
    lines.push(format!(",{}", "10,".repeat(channels.len())));
    for row in 0..rows {
        let time = (row + 1) as f64 / 10.0;
        let counts: Vec<String> = (0..channels.len())
            .map(|c| format!("{}", 100 * (c + 1) + row))
            .collect();
        lines.push(format!("{time},{},", counts.join(",")));
    }

    let path = dir.join(file);
    std::fs::write(&path, lines.join("\r\n") + "\r\n").expect("write thermo fixture");
    path
}

/// Writes an Agilent export with `rows` cycles; Time runs 0.25, 0.5, ... seconds.
pub fn write_agilent(dir: &Path, file: &str, stem: &str, date: &str, time: &str, channels: &[&str], rows: usize) -> PathBuf {
    let mut lines = vec![
        format!("D:\\MassHunter\\DATA\\run.b\\{stem}.d"),
        "Intensity Vs Time,CPS".to_string(),
        format!("Acquired      : {date} {time} using Batch run.b"),
        format!("Time [Sec],{}", channels.join(",")),
    ];
    for row in 0..rows {
        let t = (row + 1) as f64 * 0.25;
        let counts: Vec<String> = (0..channels.len())
            .map(|c| format!("{}", 1000 * (c + 1) + row))
            .collect();
        lines.push(format!("{t},{}", counts.join(",")));
    }
    lines.push("Printed:4/5/2021 11:00:00 AM".to_string());

    let path = dir.join(file);
    std::fs::write(&path, lines.join("\r\n") + "\r\n").expect("write agilent fixture");
    path
}
