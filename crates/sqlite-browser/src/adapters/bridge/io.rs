use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines, Stdin, Stdout};

use crate::error::AppResult;

pub struct NdjsonReader {
    lines: Lines<BufReader<Stdin>>,
}

impl NdjsonReader {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub async fn read_line(&mut self) -> AppResult<Option<String>> {
        let line = self.lines.next_line().await?;
        Ok(line.map(|l| l.trim_end_matches('\r').to_string()))
    }
}

pub struct NdjsonWriter {
    stdout: BufWriter<Stdout>,
}

impl NdjsonWriter {
    pub fn new() -> Self {
        Self {
            stdout: BufWriter::new(tokio::io::stdout()),
        }
    }

    pub async fn write_json_line<T: serde::Serialize>(&mut self, v: &T) -> AppResult<()> {
        let mut buf = serde_json::to_vec(v)?;
        buf.push(b'\n');
        self.stdout.write_all(&buf).await?;
        self.stdout.flush().await?;
        Ok(())
    }
}
