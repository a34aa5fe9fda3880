//! Readers for the character documents Drydock understands.
//!
//! Two dialects describe a character's skills:
//! - the game-data API character sheet (`<eveapi>` root, `skills` rowset)
//! - EVEMon's character export (`<SerializableCCPCharacter>` root)
//!
//! The account character list returned by the API is parsed here too, so the
//! HTTP client only moves bytes.

mod scan;

use drydock_types::character::SkillRow;
use drydock_types::error::{ApiError, ImportError};

use scan::{Scan, int_attr, scan};

const API_ROOT: &str = "eveapi";
const EVEMON_ROOT: &str = "SerializableCCPCharacter";

/// Name and skills read from a character document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSheet {
    pub name: String,
    pub skills: Vec<SkillRow>,
}

/// A character listed on an API account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCharacter {
    pub name: String,
    pub character_id: i64,
}

/// Which dialect a character file was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportDialect {
    ApiSheet,
    EveMon,
}

impl ImportDialect {
    /// Marker appended to the name of characters imported from this dialect.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            ImportDialect::ApiSheet => "(imported)",
            ImportDialect::EveMon => "(EVEMon)",
        }
    }
}

/// A character file after dialect detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedCharacter {
    pub sheet: CharacterSheet,
    pub dialect: ImportDialect,
}

impl ImportedCharacter {
    /// Name the imported character is stored under.
    pub fn character_name(&self) -> String {
        format!("{} {}", self.sheet.name, self.dialect.name_suffix())
    }
}

fn remote_error(scan: &Scan) -> Option<ApiError> {
    scan.error.as_ref().map(|(code, message)| ApiError::Remote {
        code: code.trim().parse().unwrap_or(0),
        message: message.clone(),
    })
}

fn expect_root(scan: &Scan, root: &str) -> Result<(), ImportError> {
    if scan.root == root {
        Ok(())
    } else {
        Err(ImportError::UnrecognizedFormat(format!(
            "expected <{root}>, found <{}>",
            scan.root
        )))
    }
}

fn skill_rows<'a>(
    rows: impl Iterator<Item = &'a scan::Attributes>,
) -> Result<Vec<SkillRow>, ImportError> {
    rows.map(|attrs| {
        Ok(SkillRow {
            type_id: int_attr(attrs, "typeID")?,
            level: int_attr(attrs, "level")?,
        })
    })
    .collect()
}

fn api_sheet(scan: &Scan) -> Result<CharacterSheet, ImportError> {
    expect_root(scan, API_ROOT)?;
    let name = scan.name.clone().ok_or(ImportError::MissingElement("name"))?;
    let skills = skill_rows(scan.rowset("skills"))?;
    Ok(CharacterSheet { name, skills })
}

/// Parse a character sheet returned by the API.
pub fn parse_api_character_sheet(xml: &str) -> Result<CharacterSheet, ApiError> {
    let scan = scan(xml)?;
    if let Some(err) = remote_error(&scan) {
        return Err(err);
    }
    Ok(api_sheet(&scan)?)
}

/// Parse the list of characters on an API account.
pub fn parse_account_characters(xml: &str) -> Result<Vec<ApiCharacter>, ApiError> {
    let scan = scan(xml)?;
    if let Some(err) = remote_error(&scan) {
        return Err(err);
    }
    expect_root(&scan, API_ROOT)?;

    let characters = scan
        .rowset("characters")
        .map(|attrs| {
            let name = attrs
                .get("name")
                .cloned()
                .ok_or(ImportError::MissingElement("name"))?;
            Ok(ApiCharacter {
                name,
                character_id: int_attr(attrs, "characterID")?,
            })
        })
        .collect::<Result<Vec<_>, ImportError>>()?;
    Ok(characters)
}

fn evemon_sheet(scan: &Scan) -> Result<CharacterSheet, ImportError> {
    expect_root(scan, EVEMON_ROOT)?;
    let name = scan.name.clone().ok_or(ImportError::MissingElement("name"))?;
    let skills = skill_rows(scan.skills.iter())?;
    Ok(CharacterSheet { name, skills })
}

/// Detect the dialect of a character file and parse it.
///
/// The API sheet dialect is tried first, then EVEMon.
pub fn parse_character_file(xml: &str) -> Result<ImportedCharacter, ImportError> {
    let scan = scan(xml)?;

    if scan.root == API_ROOT {
        if let Some((code, message)) = &scan.error {
            return Err(ImportError::UnrecognizedFormat(format!(
                "API error document {code}: {message}"
            )));
        }
        return Ok(ImportedCharacter {
            sheet: api_sheet(&scan)?,
            dialect: ImportDialect::ApiSheet,
        });
    }

    match evemon_sheet(&scan) {
        Ok(sheet) => Ok(ImportedCharacter {
            sheet,
            dialect: ImportDialect::EveMon,
        }),
        Err(ImportError::UnrecognizedFormat(_)) => Err(ImportError::UnrecognizedFormat(format!(
            "<{}> is neither an API character sheet nor an EVEMon character",
            scan.root
        ))),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const API_SHEET: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<eveapi version="2">
  <currentTime>2011-01-01 00:00:00</currentTime>
  <result>
    <characterID>150337897</characterID>
    <name>Tess Ting</name>
    <rowset name="skills" key="typeID" columns="typeID,skillpoints,level,published">
      <row typeID="3300" skillpoints="8000" level="3" published="1"/>
      <row typeID="3301" skillpoints="500" level="1" published="1"/>
    </rowset>
    <rowset name="certificates" key="certificateID" columns="certificateID">
      <row certificateID="1"/>
    </rowset>
  </result>
</eveapi>"#;

    const EVEMON: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<SerializableCCPCharacter xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <id>150337897</id>
  <name>Tess Ting</name>
  <skills>
    <skill typeID="3300" name="Gunnery" level="5" skillpoints="256000" />
    <skill typeID="3327" name="Spaceship Command" level="2" skillpoints="1415" />
  </skills>
</SerializableCCPCharacter>"#;

    const ACCOUNT: &str = r#"<eveapi version="2">
  <result>
    <rowset name="characters" key="characterID" columns="name,characterID,corporationName,corporationID">
      <row name="Tess Ting" characterID="150337897" corporationName="School" corporationID="1"/>
      <row name="Alt &amp; Co" characterID="150337898" corporationName="School" corporationID="1"/>
    </rowset>
  </result>
</eveapi>"#;

    const API_ERROR: &str = r#"<eveapi version="2">
  <error code="203">Authentication failure.</error>
</eveapi>"#;

    #[test]
    fn test_parse_api_character_sheet() {
        let sheet = parse_api_character_sheet(API_SHEET).unwrap();
        assert_eq!(sheet.name, "Tess Ting");
        assert_eq!(
            sheet.skills,
            vec![
                SkillRow { type_id: 3300, level: 3 },
                SkillRow { type_id: 3301, level: 1 },
            ]
        );
    }

    #[test]
    fn test_parse_api_error_document() {
        let err = parse_api_character_sheet(API_ERROR).unwrap_err();
        match err {
            ApiError::Remote { code, message } => {
                assert_eq!(code, 203);
                assert_eq!(message, "Authentication failure.");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_account_characters() {
        let characters = parse_account_characters(ACCOUNT).unwrap();
        assert_eq!(characters.len(), 2);
        assert_eq!(characters[0].character_id, 150337897);
        assert_eq!(characters[1].name, "Alt & Co");
    }

    #[test]
    fn test_parse_evemon_character() {
        let sheet = parse_character_file(EVEMON).unwrap().sheet;
        assert_eq!(sheet.name, "Tess Ting");
        assert_eq!(sheet.skills.len(), 2);
        assert_eq!(sheet.skills[1], SkillRow { type_id: 3327, level: 2 });
    }

    #[test]
    fn test_evemon_rejects_other_roots() {
        let api = scan(API_SHEET).unwrap();
        assert!(matches!(
            evemon_sheet(&api),
            Err(ImportError::UnrecognizedFormat(_))
        ));
    }

    #[test]
    fn test_detects_dialects() {
        let api = parse_character_file(API_SHEET).unwrap();
        assert_eq!(api.dialect, ImportDialect::ApiSheet);
        assert_eq!(api.character_name(), "Tess Ting (imported)");

        let evemon = parse_character_file(EVEMON).unwrap();
        assert_eq!(evemon.dialect, ImportDialect::EveMon);
        assert_eq!(evemon.character_name(), "Tess Ting (EVEMon)");
    }

    #[test]
    fn test_unknown_document_is_rejected() {
        let err = parse_character_file("<fitting><name>x</name></fitting>").unwrap_err();
        assert!(matches!(err, ImportError::UnrecognizedFormat(_)));
        assert!(parse_character_file("not xml at all").is_err());
    }

    #[test]
    fn test_sheet_without_name_is_rejected() {
        let xml = r#"<SerializableCCPCharacter><skills/></SerializableCCPCharacter>"#;
        assert!(matches!(
            parse_character_file(xml),
            Err(ImportError::MissingElement("name"))
        ));
    }

    #[test]
    fn test_bad_level_attribute() {
        let xml = r#"<SerializableCCPCharacter><name>X</name>
            <skill typeID="1" level="five"/></SerializableCCPCharacter>"#;
        assert!(matches!(
            parse_character_file(xml),
            Err(ImportError::InvalidAttribute { name: "level", .. })
        ));
    }
}
