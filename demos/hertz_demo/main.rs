use std::{
    io::{BufRead, Write},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use hertz::{
    logging,
    timing::{Pacer, PacerConfig},
};
use indoc::indoc;

const SPINNER: [char; 4] = ['\\', '|', '/', '-'];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Command {
    Faster,
    Slower,
    Stall,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "+" => Some(Command::Faster),
            "-" => Some(Command::Slower),
            "s" => Some(Command::Stall),
            "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Read commands from stdin on a separate thread so the paced loop never
/// blocks on input.
fn spawn_command_reader() -> Result<Receiver<Command>> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-commands".to_owned())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match Command::parse(&line) {
                    Some(command) => {
                        if sender.send(command).is_err() {
                            break;
                        }
                    }
                    None => log::warn!("unknown command {:?}", line),
                }
            }
            // stdin closed, treat it like a quit
            let _ = sender.send(Command::Quit);
        })
        .context("unable to spawn the stdin reader")?;
    Ok(receiver)
}

/// Step the rate by about one percent.
fn adjust_rate(hz: u32, command: Command) -> u32 {
    let step = (hz / 100).max(1);
    match command {
        Command::Faster => hz + step.min(5),
        Command::Slower if hz > step => hz - step,
        _ => hz,
    }
}

struct Demo {
    hz: u32,
    fps: u32,
    updates: u64,
    frames: u64,
    stall: Option<Duration>,
    quit: bool,
}

impl Demo {
    fn handle_commands(&mut self, commands: &Receiver<Command>) {
        loop {
            match commands.try_recv() {
                Ok(Command::Quit) | Err(TryRecvError::Disconnected) => {
                    self.quit = true;
                    return;
                }
                Ok(Command::Stall) => {
                    let millis = (self.updates * 7919) % 80;
                    self.stall = Some(Duration::from_millis(millis));
                }
                Ok(command) => {
                    self.hz = adjust_rate(self.hz, command);
                    log::debug!("target rate is now {} hz", self.hz);
                }
                Err(TryRecvError::Empty) => return,
            }
        }
    }

    fn update(&mut self, commands: &Receiver<Command>) {
        self.updates += 1;
        self.handle_commands(commands);
        if let Some(stall) = self.stall.take() {
            thread::sleep(stall);
        }
    }

    fn render(&mut self) {
        self.frames += 1;
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs() % 60)
            .unwrap_or(0);
        print!(
            "({}/{}) [{}] updates {:02}s [{}] frames \r",
            self.fps,
            self.hz,
            SPINNER[(self.updates % 4) as usize],
            seconds,
            SPINNER[(self.frames % 4) as usize],
        );
        let _ = std::io::stdout().flush();
    }
}

fn main() -> Result<()> {
    logging::setup()?;
    println!(
        "{}",
        indoc! {"
            Commands (type one, then press enter):
              +  raise the rate by about 1%
              -  lower the rate by about 1%
              s  stall the next update for up to 80ms
              q  quit
        "}
    );

    let commands = spawn_command_reader()?;
    let mut pacer = Pacer::new(PacerConfig::default());
    let demo = std::cell::RefCell::new(Demo {
        hz: pacer.target_hz(),
        fps: 0,
        updates: 0,
        frames: 0,
        stall: None,
        quit: false,
    });

    while !demo.borrow().quit {
        let hz = demo.borrow().hz as i32;
        let fps = pacer
            .pace(
                hz,
                || demo.borrow_mut().update(&commands),
                || demo.borrow_mut().render(),
            )
            .context("unable to pace the demo loop")?;
        demo.borrow_mut().fps = fps;
    }

    println!();
    pacer.stop().context("unable to stop the pacer")?;
    let demo = demo.into_inner();
    log::info!(
        "ran {} updates and {} frames, last observed {} fps",
        demo.updates,
        demo.frames,
        demo.fps
    );
    Ok(())
}
