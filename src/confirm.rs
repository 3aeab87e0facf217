//! 危险操作前的人工确认

use std::io::Write as _;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::Result;

/// 人工确认 Provider
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// 返回 `true` 表示用户同意继续
    async fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// 基于命令行 stdin 的确认（异步，不阻塞 tokio 工作线程）。
pub struct ConsoleConfirmer;

#[async_trait]
impl Confirmer for ConsoleConfirmer {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        println!("\n⚠️  {}", prompt);
        print!("(y/n): ");
        let _ = std::io::stdout().flush();

        let input = read_line().await?;
        Ok(is_affirmative(&input))
    }
}

fn is_affirmative(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.eq_ignore_ascii_case("y") || trimmed.eq_ignore_ascii_case("yes")
}

async fn read_line() -> Result<String> {
    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut buf = String::new();
    reader.read_line(&mut buf).await?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("yep"));
    }
}
