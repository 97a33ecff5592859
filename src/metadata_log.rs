use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    result::{Error, Result},
    types::{CaptionRecord, VideoHandle},
};

const LOG_FIELDS: [&str; 10] = [
    "author",
    "position",
    "title",
    "description",
    "keywords",
    "length",
    "publish_date",
    "views",
    "rating",
    "captions",
];

/// One CSV record for a successfully-captioned video
#[derive(Debug, Clone)]
pub struct MetadataRow {
    pub author: String,
    pub position: u64,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub length: u64,
    pub publish_date: String,
    pub views: u64,
    pub rating: Option<f64>,
    pub captions: Vec<CaptionRecord>,
}

impl MetadataRow {
    /// Build the row for one video, flattening description newlines to spaces
    pub fn new(video: &VideoHandle, position: u64, captions: Vec<CaptionRecord>) -> Self {
        Self {
            author: video.author.clone(),
            position,
            title: video.title.clone(),
            description: video.description.replace('\r', "").replace('\n', " "),
            keywords: video.keywords.clone(),
            length: video.length,
            publish_date: video.publish_date.clone(),
            views: video.views,
            rating: video.rating,
            captions,
        }
    }
}

/// Append-only CSV metadata log, one file per batch run
pub struct MetadataLog {
    out: BufWriter<File>,
}

impl MetadataLog {
    /// Create the log file and write the header
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|e| {
            Error::from(e)
                .wrap_err_with(|| format!("Could not create {}", path.as_ref().display()))
        })?;

        let mut log = Self {
            out: BufWriter::new(file),
        };
        log.write_record(&LOG_FIELDS.map(Cow::Borrowed))?;
        Ok(log)
    }

    pub fn append(&mut self, row: &MetadataRow) -> Result<()> {
        let keywords = serde_json::to_string(&row.keywords)
            .map_err(|e| Error::Malformed(e.to_string()))?;
        let captions = serde_json::to_string(&row.captions)
            .map_err(|e| Error::Malformed(e.to_string()))?;
        let rating = row.rating.map(|r| r.to_string()).unwrap_or_default();

        self.write_record(&[
            Cow::from(row.author.as_str()),
            Cow::from(row.position.to_string()),
            Cow::from(row.title.as_str()),
            Cow::from(row.description.as_str()),
            Cow::from(keywords),
            Cow::from(row.length.to_string()),
            Cow::from(row.publish_date.as_str()),
            Cow::from(row.views.to_string()),
            Cow::from(rating),
            Cow::from(captions),
        ])
    }

    fn write_record(&mut self, fields: &[Cow<'_, str>]) -> Result<()> {
        let line = fields
            .iter()
            .map(|f| csv_field(f.as_ref()))
            .collect::<Vec<_>>()
            .join(",");

        writeln!(self.out, "{line}")?;
        // Flush so the log survives an interrupted run
        self.out.flush()?;
        Ok(())
    }
}

/// The log filename stem: the group name if given, else the URL list basename
pub fn log_filename(urls_path: &Path, group: Option<&str>) -> String {
    let stem = match group {
        Some(group) => group,
        None => urls_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("urls"),
    };
    format!("{stem}_log.csv")
}

/// Quote a field per RFC 4180 if it contains a delimiter, quote, or newline
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AudioStream;

    fn sample_video() -> VideoHandle {
        VideoHandle {
            id: "abc".into(),
            author: "Chan, the Channel".into(),
            title: "A \"great\" video".into(),
            description: "line one\nline two".into(),
            keywords: vec!["kpop".into(), "news".into()],
            length: 321,
            publish_date: "2021-06-01".into(),
            views: 1000,
            rating: None,
            captions: vec![],
            streams: vec![AudioStream {
                format_id: "140".into(),
                mime_type: "audio/mp4".into(),
                ext: "m4a".into(),
            }],
        }
    }

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn row_flattens_description_newlines() {
        let row = MetadataRow::new(&sample_video(), 3, vec![]);
        assert_eq!(row.description, "line one line two");
        assert_eq!(row.position, 3);
    }

    #[test]
    fn log_contains_header_and_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("run_log.csv");

        let mut log = MetadataLog::create(&path).unwrap();
        let captions = vec![CaptionRecord("en".into(), "English".into())];
        log.append(&MetadataRow::new(&sample_video(), 1, captions))
            .unwrap();
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "author,position,title,description,keywords,length,publish_date,views,rating,captions"
        );

        let row = lines.next().unwrap();
        assert!(row.starts_with("\"Chan, the Channel\",1,"));
        assert!(row.contains("line one line two"));
        assert!(row.contains("\"[\"\"kpop\"\",\"\"news\"\"]\""));
        assert!(row.contains("English"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn log_filename_prefers_group() {
        let urls = Path::new("lists/kdrama_urls.txt");
        assert_eq!(log_filename(urls, Some("drama")), "drama_log.csv");
        assert_eq!(log_filename(urls, None), "kdrama_urls_log.csv");
    }
}
