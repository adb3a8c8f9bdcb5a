use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;

use super::progress::AptProgress;
use super::task::TaskEvent;

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandStep {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Wrap in `pkexec` so the host's polkit agent asks for credentials.
    pub fn privileged(program: &str, args: &[&str]) -> Self {
        let mut full = vec![program];
        full.extend_from_slice(args);
        Self::new("pkexec", &full)
    }

    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    fn is_apt(&self) -> bool {
        self.program == "apt" || self.args.first().map(|a| a == "apt").unwrap_or(false)
    }
}

/// Steps run in order; the first failure stops the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub label: String,
    pub steps: Vec<CommandStep>,
}

impl CommandPlan {
    pub fn new(label: &str, steps: Vec<CommandStep>) -> Self {
        Self {
            label: label.to_string(),
            steps,
        }
    }
}

/// Run every step of `plan`, streaming merged stdout/stderr lines and apt
/// progress to `tx`. Returns the last non-empty output line on success.
pub fn run_plan(plan: &CommandPlan, tx: &flume::Sender<TaskEvent>) -> Result<String, String> {
    let mut last_line = String::new();

    for step in &plan.steps {
        log::info!("[{}] running {}", plan.label, step.display());
        let mut progress = step.is_apt().then(AptProgress::new);

        let status = run_streaming(step, |line| {
            last_line = line.to_string();
            let _ = tx.send(TaskEvent::Line(line.to_string()));
            if let Some(fraction) = progress.as_mut().and_then(|p| p.feed(line)) {
                let _ = tx.send(TaskEvent::Progress {
                    fraction,
                    text: format!("{}%", (fraction * 100.0).round() as u32),
                });
            }
        })?;

        if !status.success() {
            let code = status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            log::error!("[{}] {} exited with {}", plan.label, step.display(), code);
            return Err(format!(
                "{} failed (exit status {})\n\n{}",
                step.display(),
                code,
                last_line
            ));
        }
    }

    log::info!("[{}] completed", plan.label);
    Ok(last_line)
}

fn run_streaming(
    step: &CommandStep,
    mut on_line: impl FnMut(&str),
) -> Result<std::process::ExitStatus, String> {
    let mut child = Command::new(&step.program)
        .args(&step.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to start {}: {}", step.program, e))?;

    let (line_tx, line_rx) = flume::unbounded::<String>();
    let readers: Vec<_> = [
        child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
        child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
    ]
    .into_iter()
    .flatten()
    .map(|stream| {
        let line_tx = line_tx.clone();
        thread::spawn(move || {
            // Drain to EOF even past undecodable bytes; closing the pipe
            // early would SIGPIPE the child.
            let mut reader = BufReader::new(stream);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let _ = line_tx.send(String::from_utf8_lossy(&buf).into_owned());
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        log::warn!("Reading command output failed: {}", e);
                        break;
                    }
                }
            }
        })
    })
    .collect();
    drop(line_tx);

    for line in line_rx.iter() {
        let line = line.trim();
        if !line.is_empty() {
            on_line(line);
        }
    }
    for reader in readers {
        let _ = reader.join();
    }

    child
        .wait()
        .map_err(|e| format!("Failed to wait for {}: {}", step.program, e))
}

/// Run a step to completion and return its stdout. Nonzero exit is an error
/// carrying stderr.
pub fn capture(step: &CommandStep) -> Result<String, String> {
    let output = Command::new(&step.program)
        .args(&step.args)
        .output()
        .map_err(|e| format!("Failed to run {}: {}", step.program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", step.display(), stderr.trim()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Start a program in its own session so it outlives this process.
pub fn spawn_detached(step: &CommandStep) -> Result<(), String> {
    spawn_reaped(step).map(|_| ())
}

/// Spawn detached and wait for the child on a background thread so it never
/// lingers as a zombie. Returns the child's pid.
fn spawn_reaped(step: &CommandStep) -> Result<u32, String> {
    use std::os::unix::process::CommandExt;

    let mut command = Command::new(&step.program);
    command
        .args(&step.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    // SAFETY: setsid is async-signal-safe and touches no parent state.
    unsafe {
        command.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    let mut child = command
        .spawn()
        .map_err(|e| format!("Failed to start {}: {}", step.program, e))?;
    let pid = child.id();
    log::info!("Launched {} (pid {})", step.display(), pid);

    let reaper = thread::Builder::new()
        .name("reap-child".into())
        .spawn(move || {
            let _ = child.wait();
        });
    if let Err(e) = reaper {
        log::warn!("Cannot reap pid {}: {}", pid, e);
    }
    Ok(pid)
}

/// Re-run this binary with another subcommand, detached.
pub fn launch_sibling(subcommand: &str) -> Result<(), String> {
    let exe = std::env::current_exe()
        .map_err(|e| format!("Cannot determine current executable: {}", e))?;
    spawn_detached(&CommandStep::new(&exe.to_string_lossy(), &[subcommand]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(rx: &flume::Receiver<TaskEvent>) -> Vec<TaskEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn privileged_step_prefixes_pkexec() {
        let step = CommandStep::privileged("apt", &["install", "-y", "curl"]);
        assert_eq!(step.program, "pkexec");
        assert_eq!(step.args, ["apt", "install", "-y", "curl"]);
        assert!(step.is_apt());
        assert_eq!(step.display(), "pkexec apt install -y curl");
    }

    #[test]
    fn plan_streams_both_streams() {
        let (tx, rx) = flume::unbounded();
        let plan = CommandPlan::new(
            "echo",
            vec![CommandStep::new("sh", &["-c", "echo out; echo err 1>&2"])],
        );
        run_plan(&plan, &tx).unwrap();

        let mut lines: Vec<String> = events(&rx)
            .into_iter()
            .filter_map(|e| match e {
                TaskEvent::Line(l) => Some(l),
                _ => None,
            })
            .collect();
        lines.sort();
        assert_eq!(lines, ["err", "out"]);
    }

    #[test]
    fn plan_stops_at_first_failure() {
        let (tx, rx) = flume::unbounded();
        let plan = CommandPlan::new(
            "chain",
            vec![
                CommandStep::new("sh", &["-c", "echo first; exit 3"]),
                CommandStep::new("sh", &["-c", "echo second"]),
            ],
        );
        let err = run_plan(&plan, &tx).unwrap_err();
        assert!(err.contains("exit status 3"), "{}", err);
        assert!(!events(&rx).contains(&TaskEvent::Line("second".into())));
    }

    #[test]
    fn non_utf8_output_does_not_kill_the_command() {
        let (tx, rx) = flume::unbounded();
        let plan = CommandPlan::new(
            "latin1",
            vec![CommandStep::new(
                "sh",
                &["-c", "printf 'caf\\351\\n'; sleep 0.3; echo after; exit 0"],
            )],
        );
        assert_eq!(run_plan(&plan, &tx).unwrap(), "after");

        let lines: Vec<String> = events(&rx)
            .into_iter()
            .filter_map(|e| match e {
                TaskEvent::Line(l) => Some(l),
                _ => None,
            })
            .collect();
        assert_eq!(lines, ["caf\u{FFFD}", "after"]);
    }

    #[test]
    fn missing_program_is_an_error() {
        let (tx, _rx) = flume::unbounded();
        let plan = CommandPlan::new("nope", vec![CommandStep::new("/nonexistent/soplos-bin", &[])]);
        assert!(run_plan(&plan, &tx).unwrap_err().starts_with("Failed to start"));
    }

    #[test]
    fn detached_child_is_reaped_after_exit() {
        let pid = spawn_reaped(&CommandStep::new("sh", &["-c", "exit 0"])).unwrap();
        let proc_dir = std::path::PathBuf::from(format!("/proc/{}", pid));
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while proc_dir.exists() {
            assert!(std::time::Instant::now() < deadline, "pid {} was never reaped", pid);
            thread::sleep(std::time::Duration::from_millis(20));
        }
    }

    #[test]
    fn detached_missing_program_is_an_error() {
        assert!(spawn_detached(&CommandStep::new("/nonexistent/soplos-bin", &[])).is_err());
    }

    #[test]
    fn capture_returns_stdout() {
        let out = capture(&CommandStep::new("sh", &["-c", "printf 'a\\nb'"])).unwrap();
        assert_eq!(out, "a\nb");
        assert!(capture(&CommandStep::new("sh", &["-c", "echo bad 1>&2; exit 1"]))
            .unwrap_err()
            .contains("bad"));
    }
}
