pub mod command;
pub mod parse;

use std::{io::stdout, path::PathBuf, sync::mpsc, thread};

use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, SeedableRng};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};

use crate::{
    fs::{config::DEFAULT_TOTAL_BLOCKS, Disk},
    shell::{
        command::{execute_command, Command},
        parse::parse_command,
    },
    store::{init::perform_snapshot_restore, SnapshotStore},
};

/// 启动进度事件，由快照恢复线程发给启动画面
#[derive(Debug)]
pub enum BootProgress {
    Step(&'static str),
    Progress(u64),
    Finished(Disk),
}

pub fn start_shell() {
    // shell 自己也是快照变更的观察者，保存成功后给人一个同步标记
    let (sync_tx, sync_rx) = mpsc::channel();
    let store = SnapshotStore::new(SnapshotStore::default_path()).with_notifier(sync_tx);
    let mut disk = boot_sequence(store.path().to_path_buf());
    let mut rng = StdRng::from_entropy();

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    // 初始化 reedline
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fssim_history");

    let mut line_editor = Reedline::create();
    if let Ok(history) = FileBackedHistory::with_file(100, history_path) {
        line_editor = line_editor.with_history(Box::new(history));
    }

    // 命令补全
    let commands: Vec<String> = [
        "help", "ls", "tree", "stats", "map", "journal", "frag", "create", "createat", "mkdir",
        "rm", "crash", "recover", "defrag", "demo", "format", "exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let completer = DefaultCompleter::new_with_wordlen(commands, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "minidisk".to_string());
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(format!("{}@{}", username, hostname)),
        DefaultPromptSegment::Basic("FS Simulator".to_string()),
    );

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        let exiting = matches!(cmd, Command::Exit);
                        match execute_command(&cmd, &mut disk, &mut rng) {
                            // 状态变了就立即存一次快照
                            Ok(true) => {
                                if let Err(e) = store.save(&disk) {
                                    println!("{} {}", "⚠️  Snapshot not saved:".yellow(), e);
                                } else if sync_rx.try_recv().is_ok() {
                                    println!("{}", "💾 snapshot synced".bright_black());
                                }
                            }
                            Ok(false) => {}
                            Err(e) => println!("{} {}", "❌ Error:".red().bold(), e),
                        }
                        if exiting {
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command. Type 'help' for command list.".yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting...".yellow());
                break;
            }
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    println!("{}", "GoodBye!".bright_yellow());
}

/// 启动画面：清屏、跑恢复线程、渲染进度，最后交出可用的磁盘
fn boot_sequence(snapshot_path: PathBuf) -> Disk {
    let mut stdout = stdout();

    execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0)).ok();
    println!("{}", "[FS Simulator Booting...]".bright_yellow().bold());

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || perform_snapshot_restore(snapshot_path, tx));

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut disk = None;
    for progress in rx {
        match progress {
            BootProgress::Step(step) => pb.println(step),
            BootProgress::Progress(p) => pb.set_position(p),
            BootProgress::Finished(d) => {
                disk = Some(d);
                break;
            }
        }
    }
    pb.finish_with_message("✅ Ready!");

    execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("\nWelcome to FS Simulator v0.1.0\n"),
        ResetColor
    )
    .ok();

    // 恢复线程异常退出时兜底一块新盘
    disk.unwrap_or_else(|| Disk::new(DEFAULT_TOTAL_BLOCKS))
}
