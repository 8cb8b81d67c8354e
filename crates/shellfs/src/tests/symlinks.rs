use super::sample_session;
use crate::*;

#[test]
fn test_link_resolves_from_creation_directory() -> Result<()> {
    let mut s = sample_session()?;
    s.create_file("/C/f", "in C")?;

    // Created while in /A/B, stored in /C
    s.cd("/A/B")?;
    s.link("/C/rel", "f")?;

    s.cd("/C")?;
    assert_eq!(s.cat("rel")?, "hi");
    assert_eq!(s.cat("f")?, "in C");
    Ok(())
}

#[test]
fn test_link_follows_target_replacement() -> Result<()> {
    let mut s = sample_session()?;
    let link = s.link("/L", "/A/B/f")?;

    // A rename moves the node away from the stored path
    s.rename("/A/B/f", "g")?;
    assert_eq!(s.fs().link_target(link), Err(Error::broken_link("/A/B/f")));
    assert_eq!(s.cat("/A/B/g")?, "hi");

    s.rename("/A/B/g", "f")?;
    assert_eq!(s.cat("/L")?, "hi");
    Ok(())
}

#[test]
fn test_link_loops_fail() -> Result<()> {
    let mut s = sample_session()?;
    s.link("/A/one", "/A")?;
    // /A/two -> /A/one, then repoint /A/one at /A/two
    s.link("/A/two", "/A/one")?;
    s.remove("/A/one")?;
    let (a, cwd) = (s.resolve("/A", true)?, s.cwd());
    s.fs_mut().create_symlink(a, "one", "/A/two", cwd)?;

    assert!(matches!(s.cat("/A/one"), Err(Error::SymlinkLoop { .. })));
    assert!(matches!(s.resolve("/A/two/x", true), Err(Error::SymlinkLoop { .. })));
    assert!(s.exists("/A/one"));
    Ok(())
}

#[test]
fn test_self_link_is_a_loop() -> Result<()> {
    let mut s = sample_session()?;
    let root = s.cwd();
    let me = s.fs_mut().create_symlink(root, "me", "/me", root)?;
    assert_eq!(s.fs().link_target(me), Err(Error::symlink_loop("/me")));
    Ok(())
}

#[test]
fn test_link_to_link() -> Result<()> {
    let mut s = sample_session()?;
    s.link("/toB", "/A/B")?;
    s.link("/toToB", "/toB")?;
    assert_eq!(s.list("/toToB")?, vec!["f"]);
    assert_eq!(s.absolute_path("toToB/f")?, "/A/B/f/");

    // Removing the link in the middle breaks the outer one
    s.remove("/toB")?;
    assert_eq!(
        s.resolve("/toToB", true),
        Err(Error::broken_link("/toB"))
    );
    Ok(())
}

#[test]
fn test_links_inside_removed_tree_are_dropped() -> Result<()> {
    let mut s = sample_session()?;
    let inner = s.link("/A/toC", "/C")?;
    let c = s.resolve("/C", true)?;
    assert_eq!(s.fs().backlinks(c)?, vec![inner]);

    s.remove("/A")?;
    assert!(s.fs().backlinks(c)?.is_empty());
    Ok(())
}

#[test]
fn test_remove_through_link_parent() -> Result<()> {
    let mut s = sample_session()?;
    s.link("/toB", "/A/B")?;
    s.remove("/toB/f")?;
    assert!(!s.exists("/A/B/f"));
    assert!(s.exists("/toB"));
    Ok(())
}

#[test]
fn test_removed_link_is_detached_and_broken() -> Result<()> {
    let mut s = sample_session()?;
    let link = s.link("/toB", "/A/B")?;
    let b = s.resolve("/A/B", true)?;
    assert_eq!(s.fs().backlinks(b)?, vec![link]);

    s.remove("/toB")?;
    assert!(!s.exists("/toB"));
    assert_eq!(s.fs().parent(link)?, None);
    assert_eq!(s.fs().link_target(link), Err(Error::broken_link("/A/B")));
    assert!(s.fs().backlinks(b)?.is_empty());
    Ok(())
}
