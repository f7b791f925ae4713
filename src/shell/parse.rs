use crate::{fs::CrashSeverity, shell::command::Command};

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let cmd = tokens[0];
    let args = &tokens[1..];

    match cmd {
        "help" => Some(Command::Help),
        "ls" => Some(Command::Ls(args.first().map(|s| s.to_string()))),
        "tree" => Some(Command::Tree),
        "stats" => Some(Command::Stats),
        "map" => Some(Command::Map),
        "journal" => Some(Command::Journal),
        "frag" => Some(Command::Frag),
        "create" => {
            let name = args.first()?.to_string();
            let blocks = args.get(1)?.parse().ok()?;
            let folder = args.get(2).map(|s| s.to_string());
            Some(Command::Create {
                name,
                blocks,
                folder,
            })
        }
        "createat" => {
            let name = args.first()?.to_string();
            let blocks = args.get(1)?.parse().ok()?;
            let start = args.get(2)?.parse().ok()?;
            Some(Command::CreateAt { name, blocks, start })
        }
        "mkdir" => {
            let name = args.first()?.to_string();
            let folder = args.get(1).map(|s| s.to_string());
            Some(Command::Mkdir { name, folder })
        }
        "rm" => args.first().map(|&t| Command::Rm(t.to_string())),
        "crash" => match args.first().copied() {
            Some("minor") => Some(Command::Crash(CrashSeverity::Minor)),
            Some("major") => Some(Command::Crash(CrashSeverity::Major)),
            Some("catastrophic") => Some(Command::Crash(CrashSeverity::Catastrophic)),
            _ => None,
        },
        "recover" => Some(Command::Recover),
        "defrag" => Some(Command::Defrag),
        "demo" => Some(Command::Demo),
        "format" => match args.first() {
            Some(s) => s.parse().ok().map(|size| Command::Format(Some(size))),
            None => Some(Command::Format(None)),
        },
        "exit" | "quit" => Some(Command::Exit),
        _ => None,
    }
}
