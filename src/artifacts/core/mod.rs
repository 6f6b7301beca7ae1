//! Shared output utilities

use derive_new::new;
use minus::Pager;
use std::io::{self, Write};

/// Environment variable that keeps long output out of the pager
pub const NO_PAGER_ENV: &str = "NO_PAGER";

/// `Write` adapter feeding the minus pager
///
/// ```ignore
/// let pager = Pager::new();
/// let mut writer = PagerWriter::new(pager.clone());
/// writeln!(writer, "Some long output...")?;
/// minus::page_all(pager)?;
/// ```
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl PagerWriter {
    pub fn pager(&self) -> &Pager {
        &self.pager
    }
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

/// Whether output should go through the pager: only for a terminal, and only
/// when `NO_PAGER` is unset
pub fn should_page() -> bool {
    use is_terminal::IsTerminal;

    std::env::var_os(NO_PAGER_ENV).is_none() && io::stdout().is_terminal()
}
