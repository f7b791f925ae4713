use std::error::Error;
use std::{thread, time::Duration};

use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;

use crate::{
    fs::{
        block::BlockStatus,
        config::{BLOCK_SIZE_KB, DEFAULT_TOTAL_BLOCKS, ROOT_ID},
        demo::populate_demo,
        directory::DirectoryItem,
        CrashSeverity, Disk, DiskError,
    },
    utils::format_timestamp,
};

#[derive(Debug)]
pub enum Command {
    Help,
    Ls(Option<String>),
    Tree,
    Stats,
    Map,
    Journal,
    Frag,
    Create {
        name: String,
        blocks: usize,
        folder: Option<String>,
    },
    CreateAt {
        name: String,
        blocks: usize,
        start: usize,
    },
    Mkdir {
        name: String,
        folder: Option<String>,
    },
    Rm(String),
    Crash(CrashSeverity),
    Recover,
    Defrag,
    Demo,
    Format(Option<usize>),
    Exit,
}

/// 执行一条命令。返回 Ok(true) 表示磁盘状态被改动，调用方需要存一次快照。
pub fn execute_command<R: Rng>(
    cmd: &Command,
    disk: &mut Disk,
    rng: &mut R,
) -> Result<bool, Box<dyn Error>> {
    match cmd {
        Command::Help => {
            print_help();
            Ok(false)
        }
        Command::Ls(folder) => {
            let id = resolve_folder(disk, folder)?;
            let item = disk
                .find_item(&id)
                .ok_or_else(|| DiskError::ItemNotFound(id.clone()))?;
            print_listing(item);
            Ok(false)
        }
        Command::Tree => {
            print_tree(&disk.root, 0);
            Ok(false)
        }
        Command::Stats => {
            print_stats(disk);
            Ok(false)
        }
        Command::Map => {
            print_block_map(disk);
            Ok(false)
        }
        Command::Journal => {
            print_journal(disk);
            Ok(false)
        }
        Command::Frag => {
            print_fragmentation(disk);
            Ok(false)
        }
        Command::Create {
            name,
            blocks,
            folder,
        } => {
            let parent = resolve_folder(disk, folder)?;
            disk.create_file(name, *blocks, &parent, None)?;
            println!(
                "📝 Created file: {} ({} blocks, {} KB)",
                name.green(),
                blocks,
                blocks * BLOCK_SIZE_KB
            );
            Ok(true)
        }
        Command::CreateAt {
            name,
            blocks,
            start,
        } => {
            disk.create_file(name, *blocks, ROOT_ID, Some(*start))?;
            println!(
                "📝 Created file: {} ({} blocks from position {})",
                name.green(),
                blocks,
                start
            );
            Ok(true)
        }
        Command::Mkdir { name, folder } => {
            let parent = resolve_folder(disk, folder)?;
            disk.create_folder(name, &parent)?;
            println!("✅ Created folder: {}", name.green());
            Ok(true)
        }
        Command::Rm(target) => {
            let id = resolve_item(disk, target)?;
            disk.delete_item(&id)?;
            println!("🗑️  Deleted: {}", target.red());
            Ok(true)
        }
        Command::Crash(severity) => {
            let prompt = format!(
                "This will corrupt up to {} used blocks. Continue?",
                severity.target_blocks()
            );
            if !Confirm::new().with_prompt(prompt).default(false).interact()? {
                println!("{}", "Crash cancelled.".yellow());
                return Ok(false);
            }
            let corrupted = disk.crash(*severity, rng);
            println!(
                "{} {} blocks corrupted ({})",
                "💥 Crash!".red().bold(),
                corrupted,
                severity.label()
            );
            Ok(true)
        }
        Command::Recover => {
            disk.recover();
            println!(
                "{} all corrupted blocks repaired, {} blocks in use",
                "🩹 Recovery complete:".green().bold(),
                disk.used_blocks
            );
            Ok(true)
        }
        Command::Defrag => {
            let relocated = disk.defragment();
            if relocated == 0 {
                println!("{}", "Nothing to defragment.".bright_black());
                return Ok(false);
            }
            // 整理已经瞬时完成，进度条只是给人看的回放
            let pb = ProgressBar::new(relocated as u64);
            pb.set_style(
                ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}/{len} blocks {msg}")
                    .unwrap()
                    .progress_chars("=> "),
            );
            for i in 0..relocated {
                pb.set_position(i as u64 + 1);
                thread::sleep(Duration::from_millis(10));
            }
            pb.finish_with_message("done");
            println!(
                "🧹 {} blocks reorganized, fragmentation now {}%",
                relocated,
                disk.fragmentation_score()
            );
            Ok(true)
        }
        Command::Demo => {
            let created = populate_demo(disk, rng)?;
            println!(
                "🎬 Demo data ready: {} items created, fragmentation {}%",
                created,
                disk.fragmentation_score()
            );
            Ok(true)
        }
        Command::Format(size) => {
            let total = size.unwrap_or(DEFAULT_TOTAL_BLOCKS);
            let prompt = format!("Erase everything and format {} blocks?", total);
            if !Confirm::new().with_prompt(prompt).default(false).interact()? {
                println!("{}", "Format cancelled.".yellow());
                return Ok(false);
            }
            println!("💾 Formatting virtual disk...");
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::with_template("[{bar:40.green/black}] {pos:>3}% {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            for i in 0..=100 {
                pb.set_position(i);
                thread::sleep(Duration::from_millis(5));
            }
            disk.initialize(total);
            pb.finish_with_message("✅ Disk formatted successfully!");
            Ok(true)
        }
        Command::Exit => {
            println!("{}", "👋 Exiting shell...".yellow().bold());
            Ok(false)
        }
    }
}

// 目录参数：缺省是根目录，否则先按 id 精确匹配，再按名字找
fn resolve_folder(disk: &Disk, folder: &Option<String>) -> Result<String, DiskError> {
    match folder {
        None => Ok(ROOT_ID.to_string()),
        Some(target) => match lookup(disk, target) {
            Some(item) => Ok(item.id.clone()),
            None => Err(DiskError::ParentNotFound(target.clone())),
        },
    }
}

fn resolve_item(disk: &Disk, target: &str) -> Result<String, DiskError> {
    lookup(disk, target)
        .map(|item| item.id.clone())
        .ok_or_else(|| DiskError::ItemNotFound(target.to_string()))
}

fn lookup<'a>(disk: &'a Disk, target: &str) -> Option<&'a DirectoryItem> {
    disk.find_item(target)
        .or_else(|| disk.root.find_by_name(target))
}

fn print_listing(folder: &DirectoryItem) {
    if folder.children.is_empty() {
        println!("{}", "(empty)".bright_black());
        return;
    }
    // 目录在前，文件在后，各自按名字排序
    let mut entries: Vec<&DirectoryItem> = folder.children.iter().collect();
    entries.sort_by(|a, b| {
        b.is_folder()
            .cmp(&a.is_folder())
            .then_with(|| a.name.cmp(&b.name))
    });
    for item in entries {
        if item.is_folder() {
            println!("📁 {}", item.name.blue().bold());
        } else {
            println!(
                "📄 {} {}",
                item.name,
                format!("({} KB)", item.size_blocks * BLOCK_SIZE_KB).bright_black()
            );
        }
    }
}

fn print_tree(item: &DirectoryItem, depth: usize) {
    let indent = "  ".repeat(depth);
    if item.is_folder() {
        println!("{}📁 {}", indent, item.name.blue().bold());
        for child in &item.children {
            print_tree(child, depth + 1);
        }
    } else {
        println!(
            "{}📄 {} {}",
            indent,
            item.name,
            format!("{:?}", item.block_ids).bright_black()
        );
    }
}

fn print_stats(disk: &Disk) {
    println!("{}", "📊 Disk statistics".bright_yellow().bold());
    println!("  {}: {}", "Total blocks".blue(), disk.total_blocks);
    println!("  {}: {}", "Used".blue(), disk.used_blocks.to_string().green());
    println!("  {}: {}", "Free".blue(), disk.free_blocks);
    println!(
        "  {}: {}",
        "Corrupted".blue(),
        disk.corrupted_blocks.to_string().red()
    );
    println!("  {}: {} entries", "Journal".blue(), disk.journal.len());
    print_fragmentation(disk);
}

fn print_fragmentation(disk: &Disk) {
    let score = disk.fragmentation_score();
    let label = efficiency_label(score, disk.used_blocks);
    let colored_label = match label {
        "Optimal" => label.green(),
        "Good" => label.cyan(),
        "Normal" => label.yellow(),
        "Fair" => label.magenta(),
        _ => label.red(),
    };
    println!(
        "  {}: {}% ({})",
        "Fragmentation".blue(),
        score,
        colored_label
    );
}

// 按碎片分数给一个健康度标签
fn efficiency_label(score: u32, used_blocks: usize) -> &'static str {
    if used_blocks == 0 || score < 10 {
        "Optimal"
    } else if score < 30 {
        "Good"
    } else if score < 50 {
        "Normal"
    } else if score < 70 {
        "Fair"
    } else {
        "Poor"
    }
}

fn print_block_map(disk: &Disk) {
    const PER_ROW: usize = 32;
    println!(
        "{}  {} free  {} used  {} bad  {} metadata  {} cached",
        "🗺️  Block map".bright_yellow().bold(),
        "·".bright_black(),
        "█".green(),
        "█".red(),
        "█".blue(),
        "█".yellow(),
    );
    for (row, chunk) in disk.blocks.chunks(PER_ROW).enumerate() {
        let mut line = String::new();
        for block in chunk {
            let cell = match block.status {
                BlockStatus::Free => "·".bright_black(),
                BlockStatus::Used => "█".green(),
                BlockStatus::Bad => "█".red(),
                BlockStatus::Metadata => "█".blue(),
                BlockStatus::Cached => "█".yellow(),
            };
            line.push_str(&cell.to_string());
        }
        println!("{:>4} {}", row * PER_ROW, line);
    }
}

fn print_journal(disk: &Disk) {
    if disk.journal.is_empty() {
        println!("{}", "Journal is empty.".bright_black());
        return;
    }
    println!("{}", "📜 Journal (newest first)".bright_yellow().bold());
    for entry in disk.journal.entries() {
        let outcome = match entry.outcome {
            crate::fs::Outcome::Done => entry.outcome.label().green(),
            crate::fs::Outcome::Pending => entry.outcome.label().yellow(),
            crate::fs::Outcome::Failed => entry.outcome.label().red(),
        };
        println!(
            "  {} {:>8} {:<8} {}",
            format_timestamp(entry.timestamp).bright_black(),
            entry.kind.label().cyan(),
            outcome,
            entry.target
        );
    }
}

fn print_help() {
    println!("{}", "📘 Disk simulator commands".bright_cyan().bold());
    println!(
        "{}",
        "
  ls [folder]                  List folder contents (default: root)
  tree                         Print the whole directory tree
  map                          Render the block table
  stats                        Disk statistics and fragmentation
  journal                      Show the operation journal
  frag                         Show the fragmentation score
  create <name> <blocks> [folder]   Create a file
  createat <name> <blocks> <start>  Create a file scanning from a position
  mkdir <name> [folder]        Create a folder
  rm <name|id>                 Delete a file or folder (recursive)
  crash <minor|major|catastrophic>  Simulate a disk crash
  recover                      Repair all corrupted blocks
  defrag                       Defragment the disk
  demo                         Seed demo files
  format [size]                Reset the disk (default 256 blocks)
  help                         Show this help message
  exit                         Quit the shell
"
        .bright_black()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn create_resolves_folder_by_name() {
        let mut disk = Disk::new(32);
        let mut rng = StdRng::seed_from_u64(0);
        disk.create_folder("docs", ROOT_ID).unwrap();

        let cmd = Command::Create {
            name: "a.txt".to_string(),
            blocks: 2,
            folder: Some("docs".to_string()),
        };
        let mutated = execute_command(&cmd, &mut disk, &mut rng).unwrap();
        assert!(mutated);

        let docs = disk.root.find_by_name("docs").unwrap();
        assert_eq!(docs.children.len(), 1);
        assert_eq!(docs.children[0].name, "a.txt");
    }

    #[test]
    fn create_into_unknown_folder_reports_parent_not_found() {
        let mut disk = Disk::new(32);
        let mut rng = StdRng::seed_from_u64(0);
        let cmd = Command::Create {
            name: "a.txt".to_string(),
            blocks: 2,
            folder: Some("ghost".to_string()),
        };
        let err = execute_command(&cmd, &mut disk, &mut rng).unwrap_err();
        assert!(err.to_string().contains("Parent folder not found"));
        assert_eq!(disk.used_blocks, 0);
    }

    #[test]
    fn rm_resolves_by_name_and_rejects_unknown_targets() {
        let mut disk = Disk::new(32);
        let mut rng = StdRng::seed_from_u64(0);
        disk.create_file("a.txt", 3, ROOT_ID, None).unwrap();

        let ok = execute_command(&Command::Rm("a.txt".to_string()), &mut disk, &mut rng);
        assert!(ok.unwrap());
        assert_eq!(disk.used_blocks, 0);

        let err = execute_command(&Command::Rm("a.txt".to_string()), &mut disk, &mut rng);
        assert!(err.is_err());
    }

    #[test]
    fn read_only_commands_do_not_request_a_snapshot() {
        let mut disk = Disk::new(16);
        let mut rng = StdRng::seed_from_u64(0);
        for cmd in [
            Command::Help,
            Command::Ls(None),
            Command::Tree,
            Command::Stats,
            Command::Map,
            Command::Journal,
            Command::Frag,
        ] {
            assert!(!execute_command(&cmd, &mut disk, &mut rng).unwrap());
        }
    }

    #[test]
    fn efficiency_labels_follow_the_thresholds() {
        assert_eq!(efficiency_label(0, 10), "Optimal");
        assert_eq!(efficiency_label(15, 10), "Good");
        assert_eq!(efficiency_label(35, 10), "Normal");
        assert_eq!(efficiency_label(55, 10), "Fair");
        assert_eq!(efficiency_label(90, 10), "Poor");
        // 空盘永远是 Optimal
        assert_eq!(efficiency_label(90, 0), "Optimal");
    }
}
