use derive_new::new;
use jit::errors::Result;
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::{self, Write};

/// Set to any value to print straight to stdout even on a terminal
pub const NO_PAGER_ENV: &str = "NO_PAGER";

/// Adapts the minus pager to `std::io::Write`
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(s).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn stdout_is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Run `render` against the pager when stdout is an interactive terminal,
/// against a locked stdout otherwise
pub fn paged<F>(render: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    if !stdout_is_terminal() || std::env::var_os(NO_PAGER_ENV).is_some() {
        let mut stdout = io::stdout().lock();
        render(&mut stdout)?;
        return Ok(stdout.flush()?);
    }

    let pager = Pager::new();
    let mut writer = PagerWriter::new(pager.clone());
    render(&mut writer)?;
    minus::page_all(pager).map_err(anyhow::Error::from)?;

    Ok(())
}
