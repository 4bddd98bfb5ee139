use std::io::{self, BufRead, BufReader, Write};
use std::net::SocketAddr;
use crate::command::{Command, Mode, PROMPT};
use crate::error::{ErrorReporting, IpcError, WallcycleError};
use crate::ipc::IpcServer;
use crate::manager::SelectionManager;
use crate::Result;

/// Where command text comes from.
pub enum CommandSource {
    /// Prompted line-by-line console input.
    Interactive(Box<dyn BufRead + Send>),
    /// The single-client TCP listener.
    Listener(IpcServer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Reads commands from one source and applies them to the manager.
/// The host keeps its own `Mode`; it never touches manager state directly.
pub struct InputHost {
    source: CommandSource,
    mode: Mode,
    out: Box<dyn Write + Send>,
}

impl InputHost {
    pub fn new(source: CommandSource, out: Box<dyn Write + Send>) -> Self {
        Self { source, mode: Mode::Normal, out }
    }

    pub fn interactive() -> Self {
        let stdin = BufReader::new(io::stdin());
        Self::new(CommandSource::Interactive(Box::new(stdin)), Box::new(io::stdout()))
    }

    pub fn listener(addr: SocketAddr) -> Result<Self> {
        let server = IpcServer::bind(addr)?;
        Ok(Self::new(CommandSource::Listener(server), Box::new(io::stdout())))
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.source, CommandSource::Interactive(_))
    }

    /// Next command text, or `None` once the operator is done
    /// (end of input or an interrupted read).
    fn next_command(&mut self) -> Result<Option<String>> {
        match &mut self.source {
            CommandSource::Interactive(input) => {
                write!(self.out, "{}", PROMPT)
                    .and_then(|_| self.out.flush())
                    .map_err(|e| WallcycleError::Ipc(IpcError::Console { source: e }))?;

                let mut line = String::new();
                match input.read_line(&mut line) {
                    Ok(0) => Ok(None),
                    Ok(_) => Ok(Some(line)),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
                    Err(e) => Err(WallcycleError::Ipc(IpcError::Console { source: e })),
                }
            }
            CommandSource::Listener(server) => Ok(Some(server.receive())),
        }
    }

    /// Reads and applies a single command.
    pub fn read(&mut self, manager: &SelectionManager) -> Result<Flow> {
        match self.next_command()? {
            Some(text) => Ok(self.apply(Command::parse(&text), manager)),
            None => {
                manager.request_stop();
                Ok(Flow::Stop)
            }
        }
    }

    pub fn apply(&mut self, command: Command, manager: &SelectionManager) -> Flow {
        match command {
            Command::Skip => report("skip", manager.dislike()),
            Command::Undo => report("undo", manager.undo()),
            Command::Next => report("next", manager.pick(self.mode.favorites_only())),
            Command::Fav => report("fav", manager.favorite()),
            Command::List => {
                let chosen = manager.get_chosen();
                if let Err(e) = writeln!(self.out, "Mode: {}", self.mode)
                    .and_then(|_| writeln!(self.out, "Wall: {}", chosen.display()))
                {
                    log::warn!("Failed to print listing: {}", e);
                }
            }
            Command::Mode(Some(mode)) => {
                log::info!("Switching to {} mode", mode);
                self.mode = mode;
            }
            Command::Mode(None) | Command::Noop => {}
            Command::Unknown => log::debug!("Ignoring unrecognized command"),
            Command::Stop => {
                manager.request_stop();
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Serves commands until a stop command, the end of input, an input
    /// failure, or a stop requested elsewhere.
    pub fn run(&mut self, manager: &SelectionManager) -> Result<()> {
        loop {
            let flow = match self.read(manager) {
                Ok(flow) => flow,
                Err(e) => {
                    manager.request_stop();
                    return Err(e);
                }
            };

            if flow == Flow::Stop || manager.is_stopped() {
                return Ok(());
            }
        }
    }
}

fn report<T>(action: &str, result: Result<T>) {
    if let Err(e) = result {
        log::error!("{} failed: {}", action, e.user_friendly_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::IpcClient;
    use crate::manager::tests::{manager_with, SharedBuffer};
    use std::io::Cursor;
    use std::net::Ipv4Addr;
    use std::path::PathBuf;
    use std::time::Duration;

    fn scripted(script: &str) -> (InputHost, SharedBuffer) {
        let out = SharedBuffer::default();
        let source = CommandSource::Interactive(Box::new(Cursor::new(script.to_string().into_bytes())));
        (InputHost::new(source, Box::new(out.clone())), out)
    }

    #[test]
    fn test_list_prints_mode_and_chosen() {
        let (manager, _background, _dir) = manager_with(&["a.jpg"], "seed.jpg");
        let (mut host, out) = scripted("list\n");

        assert_eq!(host.read(&manager).unwrap(), Flow::Continue);

        let printed = out.contents();
        assert!(printed.starts_with(PROMPT));
        assert!(printed.contains("Mode: Normal\n"));
        assert!(printed.contains("Wall: seed.jpg\n"));
    }

    #[test]
    fn test_commands_drive_manager() {
        let (manager, background, _dir) = manager_with(&["a.jpg", "b.jpg", "c.jpg"], "seed.jpg");
        let (mut host, _out) = scripted("n\nNEXT\nu\nfa\nsk\n");

        for _ in 0..5 {
            assert_eq!(host.read(&manager).unwrap(), Flow::Continue);
        }

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.favorites.len(), 1);
        assert_eq!(snapshot.disliked, snapshot.favorites);
        assert_eq!(background.shown().len(), 4);
        assert!(!manager.is_stopped());
    }

    #[test]
    fn test_mode_switch_changes_next() {
        let (manager, _background, _dir) = manager_with(&["a.jpg", "b.jpg"], "fav.jpg");
        manager.favorite().unwrap();
        let (mut host, out) = scripted("mode fav\nnext\nlist\nmode\nmode normal\n");

        host.read(&manager).unwrap();
        assert_eq!(host.mode, Mode::Favorites);
        host.read(&manager).unwrap();
        assert_eq!(manager.get_chosen(), PathBuf::from("fav.jpg"));
        host.read(&manager).unwrap();
        assert!(out.contents().contains("Mode: Fav\n"));
        host.read(&manager).unwrap();
        assert_eq!(host.mode, Mode::Favorites);
        host.read(&manager).unwrap();
        assert_eq!(host.mode, Mode::Normal);
    }

    #[test]
    fn test_unknown_and_noop_keep_looping() {
        let (manager, background, _dir) = manager_with(&["a.jpg"], "seed.jpg");
        let (mut host, _out) = scripted("bogus\nnoop\n\n");

        for _ in 0..3 {
            assert_eq!(host.read(&manager).unwrap(), Flow::Continue);
        }
        assert!(background.shown().is_empty());
        assert_eq!(manager.history_len(), 1);
    }

    #[test]
    fn test_stop_command_requests_stop() {
        let (manager, _background, _dir) = manager_with(&["a.jpg"], "seed.jpg");
        let (mut host, _out) = scripted("quit\nnext\n");

        assert_eq!(host.read(&manager).unwrap(), Flow::Stop);
        assert!(manager.is_stopped());
    }

    #[test]
    fn test_end_of_input_requests_stop() {
        let (manager, _background, _dir) = manager_with(&["a.jpg"], "seed.jpg");
        let (mut host, _out) = scripted("next\n");

        host.run(&manager).unwrap();

        assert!(manager.is_stopped());
        assert_eq!(manager.history_len(), 2);
    }

    #[test]
    fn test_manager_errors_do_not_end_the_loop() {
        let (manager, _background, _dir) = manager_with(&[], "seed.jpg");
        let (mut host, _out) = scripted("next\nskip\nlist\n");

        for _ in 0..3 {
            assert_eq!(host.read(&manager).unwrap(), Flow::Continue);
        }
        assert_eq!(manager.get_chosen(), PathBuf::from("seed.jpg"));
    }

    #[test]
    fn test_listener_zero_read_then_list_still_works() {
        let (manager, _background, _dir) = manager_with(&["a.jpg"], "seed.jpg");
        let server = IpcServer::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let addr = server.local_addr().unwrap();
        let mut listener = InputHost::new(CommandSource::Listener(server), Box::new(SharedBuffer::default()));

        drop(IpcClient::connect(addr).unwrap());
        assert_eq!(listener.read(&manager).unwrap(), Flow::Continue);
        match &listener.source {
            CommandSource::Listener(server) => assert!(!server.has_client()),
            CommandSource::Interactive(_) => unreachable!(),
        }

        let (mut console, out) = scripted("list\n");
        assert_eq!(console.read(&manager).unwrap(), Flow::Continue);
        assert!(out.contents().contains("Wall: seed.jpg"));
    }

    #[test]
    fn test_listener_applies_remote_commands() {
        let (manager, _background, _dir) = manager_with(&["a.jpg", "b.jpg"], "seed.jpg");
        let server = IpcServer::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let addr = server.local_addr().unwrap();
        let mut host = InputHost::new(CommandSource::Listener(server), Box::new(SharedBuffer::default()));
        assert!(!host.is_interactive());

        let mut client = IpcClient::connect(addr).unwrap();
        client.send("next\n").unwrap();
        assert_eq!(host.read(&manager).unwrap(), Flow::Continue);
        assert_eq!(manager.history_len(), 2);

        client.send("done").unwrap();
        assert_eq!(host.read(&manager).unwrap(), Flow::Stop);
        assert!(manager.is_stopped());
    }
}
