use std::{
    io::{self, BufRead},
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use delve_system_scheduler::InputSource;
use log::warn;

/// Keystrokes read from standard input on a background thread.
///
/// Terminals deliver input line by line, so keys arrive once the player
/// presses enter.
#[derive(Debug)]
pub(crate) struct StdinInput {
    receiver: Receiver<char>,
}

impl StdinInput {
    pub(crate) fn spawn() -> Self {
        let (sender, receiver) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name(String::from("delve-stdin"))
            .spawn(move || forward(io::stdin().lock(), &sender));
        if let Err(error) = spawned {
            warn!("keyboard input unavailable: {error}");
        }
        Self { receiver }
    }
}

impl InputSource for StdinInput {
    fn poll(&mut self) -> Option<char> {
        self.receiver.try_recv().ok()
    }
}

fn forward<R: BufRead>(reader: R, sender: &Sender<char>) {
    for line in reader.lines() {
        let Ok(line) = line else {
            return;
        };
        for key in line.chars() {
            if sender.send(key).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn forwards_every_key_without_line_breaks() {
        let (sender, receiver) = mpsc::channel();

        forward(Cursor::new("wd\n:q\n"), &sender);
        drop(sender);

        assert_eq!(receiver.iter().collect::<String>(), "wd:q");
    }

    #[test]
    fn empty_channel_polls_nothing() {
        let (_sender, receiver) = mpsc::channel();
        let mut input = StdinInput { receiver };

        assert_eq!(input.poll(), None);
    }
}
