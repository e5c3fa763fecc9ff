use log::{debug, warn};
use mailparse::{DispositionType, ParsedMail};
use std::collections::HashSet;

use super::header::decode_text;

/// Walks the parts of a parsed email depth-first, in the order they
/// appear in the message. The root part comes first.
#[derive(Debug)]
pub struct PartsIterator<'a> {
    stack: Vec<&'a ParsedMail<'a>>,
}

impl<'a> PartsIterator<'a> {
    pub fn new(part: &'a ParsedMail<'a>) -> Self {
        Self { stack: vec![part] }
    }
}

impl<'a> Iterator for PartsIterator<'a> {
    type Item = &'a ParsedMail<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        self.stack.extend(part.subparts.iter().rev());
        Some(part)
    }
}

pub fn is_multipart(part: &ParsedMail) -> bool {
    part.ctype.mimetype.starts_with("multipart/")
}

pub fn is_attachment(part: &ParsedMail) -> bool {
    matches!(
        part.get_content_disposition().disposition,
        DispositionType::Attachment
    )
}

/// Decodes the payload of a part as text, using its declared charset.
/// Undecodable bytes are dropped, and an undecodable transfer
/// encoding gives an empty text.
pub fn decode_part_text(part: &ParsedMail) -> String {
    let body = match part.get_body_raw() {
        Ok(body) => body,
        Err(err) => {
            warn!("cannot decode body of {} part, skipping it", part.ctype.mimetype);
            warn!("{}", err);
            return String::new();
        }
    };

    let charset = part.ctype.params.get("charset").map(String::as_str);
    decode_text(&body, charset).text
}

/// Strips markup from an HTML document, keeping the visible text only.
pub fn html_to_text(html: &str) -> String {
    let text = ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(html)
        .to_string();

    html_escape::decode_html_entities(&text).to_string()
}

fn find_inline_part<'a>(parsed: &'a ParsedMail<'a>, mimetype: &str) -> Option<&'a ParsedMail<'a>> {
    PartsIterator::new(parsed)
        .find(|part| part.ctype.mimetype == mimetype && !is_attachment(part))
}

/// Extracts the body of an email.
///
/// A single part email gives its decoded payload. A multipart email
/// gives the first inline text/plain part, or the first inline
/// text/html part reduced to text, or nothing.
pub fn extract_body(parsed: &ParsedMail) -> String {
    if !is_multipart(parsed) {
        return decode_part_text(parsed);
    }

    if let Some(part) = find_inline_part(parsed, "text/plain") {
        debug!("using text/plain part as body");
        return decode_part_text(part);
    }

    if let Some(part) = find_inline_part(parsed, "text/html") {
        debug!("using text/html part as body");
        return html_to_text(&decode_part_text(part));
    }

    debug!("no body part found");
    String::new()
}

#[cfg(test)]
mod test_parts_iterator {
    use lettre::{
        message::{MultiPart, SinglePart},
        Message,
    };
    use mailparse::MailHeaderMap;

    use super::PartsIterator;

    #[test]
    fn test_one_part_no_subpart() {
        let email = Message::builder()
            .from("from@localhost".parse().unwrap())
            .to("to@localhost".parse().unwrap())
            .singlepart(SinglePart::plain(String::new()))
            .unwrap()
            .formatted();
        let email = mailparse::parse_mail(&email).unwrap();

        let parts = PartsIterator::new(&email).collect::<Vec<_>>();

        assert_eq!(1, parts.len());
        assert!(parts[0]
            .get_headers()
            .get_first_value("Content-Type")
            .unwrap()
            .starts_with("text/plain"));
    }

    #[test]
    fn test_depth_first_order() {
        let email = Message::builder()
            .from("from@localhost".parse().unwrap())
            .to("to@localhost".parse().unwrap())
            .multipart(
                MultiPart::mixed()
                    .multipart(
                        MultiPart::alternative()
                            .singlepart(SinglePart::plain(String::from("first")))
                            .singlepart(SinglePart::html(String::from("<p>first</p>"))),
                    )
                    .singlepart(SinglePart::plain(String::from("second"))),
            )
            .unwrap()
            .formatted();
        let email = mailparse::parse_mail(&email).unwrap();

        let mimetypes = PartsIterator::new(&email)
            .map(|part| part.ctype.mimetype.as_str())
            .collect::<Vec<_>>();

        assert_eq!(
            vec![
                "multipart/mixed",
                "multipart/alternative",
                "text/plain",
                "text/html",
                "text/plain"
            ],
            mimetypes
        );
    }
}

#[cfg(test)]
mod test_extract_body {
    use super::{extract_body, html_to_text};

    #[test]
    fn test_single_part() {
        let email = mailparse::parse_mail(concat!(
            "From: from@localhost\r\n",
            "Subject: subject\r\n",
            "\r\n",
            "Hello!",
        ).as_bytes())
        .unwrap();

        assert_eq!("Hello!", extract_body(&email));
    }

    #[test]
    fn test_single_part_invalid_bytes() {
        let email = mailparse::parse_mail(b"Subject: subject\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nHel\xfflo!").unwrap();

        assert_eq!("Hello!", extract_body(&email));
    }

    #[test]
    fn test_plain_wins_over_html() {
        let email = mailparse::parse_mail(concat!(
            "Content-Type: multipart/alternative; boundary=boundary\r\n",
            "\r\n",
            "--boundary\r\n",
            "Content-Type: text/html\r\n",
            "\r\n",
            "<p>html</p>\r\n",
            "--boundary\r\n",
            "Content-Type: text/plain; charset=iso-8859-1\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "Caff=E8\r\n",
            "--boundary\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "second\r\n",
            "--boundary--\r\n",
        ).as_bytes())
        .unwrap();

        assert_eq!("Caffè", extract_body(&email).trim_end());
    }

    #[test]
    fn test_attached_text_is_not_body() {
        let email = mailparse::parse_mail(concat!(
            "Content-Type: multipart/mixed; boundary=boundary\r\n",
            "\r\n",
            "--boundary\r\n",
            "Content-Type: text/plain\r\n",
            "Content-Disposition: attachment; filename=notes.txt\r\n",
            "\r\n",
            "notes\r\n",
            "--boundary\r\n",
            "Content-Type: text/html\r\n",
            "\r\n",
            "<p>Hi &amp; bye</p>\r\n",
            "--boundary--\r\n",
        ).as_bytes())
        .unwrap();

        assert_eq!("Hi & bye", extract_body(&email).trim());
    }

    #[test]
    fn test_no_body_part() {
        let email = mailparse::parse_mail(concat!(
            "Content-Type: multipart/mixed; boundary=boundary\r\n",
            "\r\n",
            "--boundary\r\n",
            "Content-Type: application/pdf\r\n",
            "\r\n",
            "%PDF\r\n",
            "--boundary--\r\n",
        ).as_bytes())
        .unwrap();

        assert_eq!("", extract_body(&email));
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!("Hi", html_to_text("<p>Hi</p>"));
        assert_eq!(
            "Title1 < 2",
            html_to_text("<h1>Title</h1><p>1 &lt; 2</p><script>alert(1)</script>")
        );
    }
}
