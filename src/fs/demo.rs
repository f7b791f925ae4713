use rand::{seq::SliceRandom, Rng};

use crate::fs::{config::ROOT_ID, error::Result, Disk};

// 随机名字的词表
const ADJECTIVES: &[&str] = &[
    "new", "my", "temp", "backup", "data", "project", "work", "test",
];
const NOUNS: &[&str] = &[
    "file", "doc", "report", "image", "video", "audio", "archive", "backup",
];
const EXTENSIONS: &[&str] = &[
    ".txt", ".pdf", ".doc", ".jpg", ".mp4", ".zip", ".dat", ".csv",
];

/// 随机文件名，形如 `backup-report-42.pdf`
pub fn random_file_name<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}-{}-{}{}",
        pick(ADJECTIVES, rng),
        pick(NOUNS, rng),
        rng.gen_range(0..100),
        pick(EXTENSIONS, rng)
    )
}

/// 随机目录名，形如 `temp-archive-7`
pub fn random_folder_name<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}-{}-{}",
        pick(ADJECTIVES, rng),
        pick(NOUNS, rng),
        rng.gen_range(0..100)
    )
}

// 随机文件大小（块数）
fn random_file_size<R: Rng>(rng: &mut R) -> usize {
    rng.gen_range(4..12)
}

fn pick<'a, R: Rng>(words: &[&'a str], rng: &mut R) -> &'a str {
    words.choose(rng).copied().unwrap_or("misc")
}

/// 填充演示数据：两个目录加一批随机大小的文件，
/// 中途删掉几个制造空洞，后续文件跨洞分配就会出现碎片，
/// 正好用来演示碎片评分和整理。随机源由调用方注入。
pub fn populate_demo<R: Rng>(disk: &mut Disk, rng: &mut R) -> Result<usize> {
    let docs = disk.create_folder(&random_folder_name(rng), ROOT_ID)?;
    let media = disk.create_folder(&random_folder_name(rng), ROOT_ID)?;

    let mut created = 2;
    let mut victims = Vec::new();
    for i in 0..6 {
        let parent = if i % 2 == 0 { &docs } else { &media };
        let id = disk.create_file(&random_file_name(rng), random_file_size(rng), parent, None)?;
        created += 1;
        if i == 1 || i == 3 {
            victims.push(id);
        }
    }

    // 删掉中间的两个文件留下空洞
    for id in victims {
        disk.delete_item(&id)?;
        created -= 1;
    }

    // 再塞两个比任何空洞都大的文件，first-fit 必然让它们跨洞分段
    for _ in 0..2 {
        let size = rng.gen_range(12..16);
        disk.create_file(&random_file_name(rng), size, ROOT_ID, None)?;
        created += 1;
    }

    Ok(created)
}
