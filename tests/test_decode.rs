use std::collections::BTreeSet;

use mailbox_backup::{email, sanitize_filename, DecodedEmail, RECORD_DELIM};

#[test]
fn test_decode_plain_email() {
    let email = email::decode(include_bytes!("./emails/alice-to-patrick.eml")).unwrap();

    assert_eq!("Alice <alice@localhost>", email.from);
    assert_eq!("Patrick <patrick@localhost>", email.to);
    assert_eq!("", email.cc);
    assert_eq!("Plain message", email.subject);
    assert_eq!("Ceci est un message.", email.body.trim());
    assert_eq!(
        BTreeSet::from_iter(["alice@localhost".to_owned(), "patrick@localhost".to_owned()]),
        email.addresses
    );
    assert!(email.attachments.is_empty());
    assert!(email.attachment_names.is_empty());
}

#[test]
fn test_decode_draft_with_attachments() {
    let email = email::decode(include_bytes!("./emails/draft-with-attachments.eml")).unwrap();

    assert_eq!("Preventivo caffè", email.subject);
    assert_eq!(
        vec![
            "anna@example.it",
            "luca.bianchi@example.com",
            "mario.rossi@example.it",
            "team@example.it",
        ],
        email.addresses.iter().collect::<Vec<_>>()
    );

    // the plain part wins even if the html one comes first
    assert!(email.body.trim().starts_with("Ciao Anna,"));
    assert!(email.body.contains("ecco il preventivo."));
    assert!(!email.body.contains("<p>"));

    assert_eq!(1, email.attachments.len());
    assert_eq!("preventivo caffè.pdf", email.attachments[0].filename);
    assert_eq!(b"%PDF-1.4\n".to_vec(), email.attachments[0].data);
    assert_eq!(
        vec!["preventivo caffè.pdf", "vuoto.txt"],
        email.attachment_names
    );
}

#[test]
fn test_decode_html_newsletter() {
    let email = email::decode(include_bytes!("./emails/html-newsletter.eml")).unwrap();

    // the iso-8859-1 word following the utf-8 one is left out
    assert_eq!("✅ Offerta", email.subject);
    assert!(email.body.contains("Offerta"));
    assert!(email.body.contains("Sconto & spedizione"));
    assert!(!email.body.contains('<'));
}

#[test]
fn test_decode_is_deterministic() {
    let raw = include_bytes!("./emails/draft-with-attachments.eml");

    let first = email::decode(raw).unwrap();
    let second = DecodedEmail::try_from(&raw[..]).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_record(), second.to_record());
}

#[test]
fn test_record() {
    let email = email::decode(include_bytes!("./emails/draft-with-attachments.eml")).unwrap();
    let record = email.to_record();

    assert!(record.starts_with(
        "From: \"Mario Rossi\" <mario.rossi@example.it>\nTo: anna@example.it, \"Luca\" <luca.bianchi@example.com>\nCc: team@example.it\nSubject: Preventivo caffè\n\nBody:\nCiao Anna,"
    ));
    assert!(record.ends_with(&format!(
        "\n\nAttachments: preventivo caffè.pdf, vuoto.txt\n{}\n",
        RECORD_DELIM
    )));
}

#[test]
fn test_attachment_names_are_safe_on_disk() {
    let email = email::decode(include_bytes!("./emails/draft-with-attachments.eml")).unwrap();

    for attachment in &email.attachments {
        let name = attachment.sanitized_filename();
        assert_eq!(name, sanitize_filename(&name));
        assert!(!name.contains('/'));
    }
}

#[test]
fn test_decode_latin1_filenames() {
    let email = email::decode(include_bytes!("./emails/latin1-filenames.eml")).unwrap();

    assert_eq!("Hello", email.body.trim());
    assert_eq!(
        vec!["résumé?.pdf", "cv-résumé.txt"],
        email.attachment_names
    );
    assert_eq!(2, email.attachments.len());
    assert_eq!(b"%PDF-1.4\n".to_vec(), email.attachments[0].data);
    assert!(email.attachments[1].data.starts_with(b"curriculum"));

    assert_eq!("résumé_.pdf", email.attachments[0].sanitized_filename());
    assert_eq!("cv-résumé.txt", email.attachments[1].sanitized_filename());
}
