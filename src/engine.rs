// UCI engine subprocess. One process per `UciEngine`; dropping it shuts the
// process down.

use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use shakmaty::uci::UciMove;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine closed its output")]
    Exited,

    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),

    #[error("invalid engine response: {0}")]
    InvalidResponse(String),

    #[error("engine has no move in this position")]
    NoMove,

    #[error("engine proposed an illegal move: {0}")]
    IllegalMove(String),
}

/// Handle to a running UCI engine.
///
/// The process is started by [`UciEngine::launch`], which also performs the
/// `uci`/`isready` handshake. Queries are synchronous: [`UciEngine::best_move`]
/// blocks until the engine answers with `bestmove`. Only the handshake and
/// `isready` round trips have a deadline; a search may take as long as it needs.
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    lines: Receiver<io::Result<String>>,
    name: String,
    timeout: Duration,
}

impl UciEngine {
    /// How long a starting engine gets to report `uciok` and `readyok`.
    pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Starts the engine at `path` and waits until it reports ready.
    pub fn launch<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        Self::launch_with_timeout(path, Self::HANDSHAKE_TIMEOUT)
    }

    /// Like [`UciEngine::launch`], giving up on a silent or non-UCI program
    /// after `timeout`. The process is killed in that case.
    pub fn launch_with_timeout<P: AsRef<Path>>(
        path: P,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let mut process = Command::new(path.as_ref())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let (Some(stdin), Some(stdout)) = (process.stdin.take(), process.stdout.take()) else {
            let _ = process.kill();
            let _ = process.wait();
            return Err(EngineError::InvalidResponse("no stdio pipes".to_owned()));
        };
        let lines = match spawn_reader(stdout) {
            Ok(lines) => lines,
            Err(e) => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(e);
            }
        };

        let mut engine = Self {
            process,
            stdin,
            lines,
            name: String::new(),
            timeout,
        };
        engine.handshake()?;
        Ok(engine)
    }

    /// Name from `id name`, empty if the engine did not send one.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        self.send(&format!("setoption name {name} value {value}"))?;
        self.sync()
    }

    /// Asks for the best move after `moves` from the start position,
    /// searching to `depth` plies.
    pub fn best_move(&mut self, moves: &[UciMove], depth: u32) -> Result<UciMove, EngineError> {
        if moves.is_empty() {
            self.send("position startpos")?;
        } else {
            let moves: Vec<String> = moves.iter().map(ToString::to_string).collect();
            self.send(&format!("position startpos moves {}", moves.join(" ")))?;
        }
        self.send(&format!("go depth {depth}"))?;

        loop {
            let line = self.read_line(None)?;
            let mut words = line.split_whitespace();
            if words.next() != Some("bestmove") {
                continue;
            }
            return match words.next() {
                None => Err(EngineError::InvalidResponse(line)),
                Some("(none)") | Some("0000") => Err(EngineError::NoMove),
                Some(m) => m
                    .parse()
                    .map_err(|_| EngineError::InvalidResponse(line.clone())),
            };
        }
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        let deadline = Instant::now() + self.timeout;
        self.send("uci")?;
        loop {
            let line = self.read_line(Some(deadline))?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = name.to_owned();
            }
            if line == "uciok" {
                break;
            }
        }
        self.sync()
    }

    fn sync(&mut self) -> Result<(), EngineError> {
        let deadline = Instant::now() + self.timeout;
        self.send("isready")?;
        while self.read_line(Some(deadline))? != "readyok" {}
        Ok(())
    }

    fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        log::trace!(">> {cmd}");
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Next line from the engine. With a deadline, gives up once it passes.
    fn read_line(&mut self, deadline: Option<Instant>) -> Result<String, EngineError> {
        let received = match deadline {
            None => self.lines.recv().map_err(|_| EngineError::Exited),
            Some(deadline) => self
                .lines
                .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                .map_err(|e| match e {
                    RecvTimeoutError::Timeout => EngineError::Timeout(self.timeout),
                    RecvTimeoutError::Disconnected => EngineError::Exited,
                }),
        };
        let line = received??;
        log::trace!("<< {line}");
        Ok(line)
    }
}

// Forwards the engine's stdout line by line. The thread ends, closing the
// channel, when the engine closes its output or is killed.
fn spawn_reader(stdout: ChildStdout) -> Result<Receiver<io::Result<String>>, EngineError> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("uci-reader".to_owned())
        .spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let line = line.map(|l| l.trim().to_owned());
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(rx)
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let _ = self.process.kill();
        let _ = self.process.wait();
        log::debug!("engine process stopped");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    // A shell script speaking just enough UCI; answers every `go` with `reply`.
    #[cfg(unix)]
    pub(crate) fn fake_engine(dir: &Path, reply: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-engine");
        let script = format!(
            "#!/bin/sh\n\
             while read -r cmd rest; do\n\
               case \"$cmd\" in\n\
                 uci) echo 'id name Fake 1.0'; echo 'uciok' ;;\n\
                 isready) echo 'readyok' ;;\n\
                 go) echo 'info depth 1'; echo '{reply}' ;;\n\
                 quit) exit 0 ;;\n\
               esac\n\
             done\n"
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    // Freshly written scripts can briefly fail with ETXTBSY while another
    // test thread is forking.
    #[cfg(unix)]
    pub(crate) fn launch(path: &Path) -> Result<UciEngine, EngineError> {
        launch_within(path, UciEngine::HANDSHAKE_TIMEOUT)
    }

    #[cfg(unix)]
    fn launch_within(path: &Path, timeout: Duration) -> Result<UciEngine, EngineError> {
        for _ in 0..20 {
            match UciEngine::launch_with_timeout(path, timeout) {
                Err(EngineError::Io(e)) if e.raw_os_error() == Some(26) => {
                    thread::sleep(Duration::from_millis(25));
                }
                other => return other,
            }
        }
        UciEngine::launch_with_timeout(path, timeout)
    }

    #[test]
    fn launch_missing_binary_fails() {
        match UciEngine::launch("/nonexistent/path/to/engine") {
            Err(EngineError::Io(_)) => {}
            Err(e) => panic!("expected io error, got {e}"),
            Ok(_) => panic!("expected launch failure"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn handshake_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = launch(&fake_engine(dir.path(), "bestmove e7e5 ponder g1f3")).unwrap();
        assert_eq!(engine.name(), "Fake 1.0");
        engine.set_option("Skill Level", "20").unwrap();

        let played: Vec<UciMove> = vec!["e2e4".parse().unwrap()];
        let m = engine.best_move(&played, 6).unwrap();
        assert_eq!(m.to_string(), "e7e5");
    }

    #[cfg(unix)]
    #[test]
    fn bestmove_none_is_no_move() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = launch(&fake_engine(dir.path(), "bestmove (none)")).unwrap();
        assert!(matches!(engine.best_move(&[], 1), Err(EngineError::NoMove)));
    }

    #[cfg(unix)]
    #[test]
    fn garbage_bestmove_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = launch(&fake_engine(dir.path(), "bestmove zz99")).unwrap();
        assert!(matches!(
            engine.best_move(&[], 1),
            Err(EngineError::InvalidResponse(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn engine_that_exits_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mute-engine");
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        match launch(&path) {
            Err(EngineError::Exited) | Err(EngineError::Io(_)) => {}
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("mute engine should not launch"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_uci_program_times_out() {
        let started = Instant::now();
        // `cat` echoes `uci` back and never says `uciok`.
        match UciEngine::launch_with_timeout("/bin/cat", Duration::from_millis(200)) {
            Err(EngineError::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(200)),
            Err(e) => panic!("expected timeout, got {e}"),
            Ok(_) => panic!("cat is not an engine"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn engine_that_never_gets_ready_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stuck-engine");
        let script = "#!/bin/sh\n\
                      while read -r cmd rest; do\n\
                        case \"$cmd\" in\n\
                          uci) echo 'id name Stuck'; echo 'uciok' ;;\n\
                          quit) exit 0 ;;\n\
                        esac\n\
                      done\n";
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(
            launch_within(&path, Duration::from_millis(300)),
            Err(EngineError::Timeout(_))
        ));
    }
}
