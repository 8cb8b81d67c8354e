mod symlinks;

use crate::Session;

/// /A/B/f containing "hi", plus an empty /C.
fn sample_session() -> crate::Result<Session> {
    crate::init_diagnostics();
    let mut s = Session::new();
    s.mkdir("/A")?;
    s.mkdir("/A/B")?;
    s.create_file("/A/B/f", "hi")?;
    s.mkdir("/C")?;
    Ok(s)
}
