use std::io::{self, BufRead, IsTerminal};

/// Read one line, `None` on EOF or Ctrl-C.
///
/// Terminals get a `dialoguer` prompt; piped stdin is read as plain lines.
pub(crate) fn read_line(prompt: &str) -> io::Result<Option<String>> {
    if !io::stdin().is_terminal() {
        println!("{prompt}");
        return read_piped(&mut io::stdin().lock());
    }

    let answer = dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text();

    match answer {
        Ok(line) => Ok(Some(line)),
        Err(dialoguer::Error::IO(e))
            if matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof
            ) =>
        {
            tracing::debug!("input closed: {e}");
            Ok(None)
        }
        Err(dialoguer::Error::IO(e)) => Err(e),
    }
}

fn read_piped(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        tracing::debug!("stdin reached EOF");
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}
