#[cfg(feature = "imap-backend")]
use mailbox_backup::{
    Backup, FolderKeywords, FolderRole, FolderWriter, ImapConfig, ImapSession, MailSession,
};

#[cfg(feature = "imap-backend")]
#[test]
#[ignore = "requires an IMAP server listening on localhost:3143"]
fn test_imap_session() {
    let imap_config = ImapConfig {
        host: Some("localhost".into()),
        port: Some(3143),
        ssl: Some(false),
        starttls: Some(false),
        insecure: Some(true),
        login: Some("patrick@localhost".into()),
        passwd: Some("password".into()),
    };

    // checking that the session can connect
    let mut imap = ImapSession::connect(&imap_config).unwrap();

    // checking that the inbox is listed
    let folders = imap.list_folders().unwrap();
    assert!(folders.iter().any(|folder| folder.name().as_deref() == Some("INBOX")));

    // checking that every email of the inbox can be fetched
    imap.select_folder("INBOX").unwrap();
    for id in imap.search_all().unwrap() {
        assert!(!imap.fetch_raw(&id).unwrap().is_empty());
    }

    // checking that the inbox can be backed up
    let dir = tempfile::tempdir().unwrap();
    let mut backup = Backup::new(
        &mut imap,
        FolderWriter::new(dir.path()),
        FolderKeywords::default(),
    );
    let report = backup.run(&[FolderRole::Inbox]);
    assert!(report.outcomes[0].is_done());
    assert!(dir.path().join("INBOX").join("contents.txt").exists());

    imap.logout().unwrap();
}
