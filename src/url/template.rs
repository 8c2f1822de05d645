//! Date templates for seed URLs
//!
//! Sites publish one page set per day under a URL that embeds the date.
//! A configured URL carries one concrete sample date; the layout of that
//! date is detected and then re-rendered for every requested day.

use crate::UrlError;
use chrono::NaiveDate;
use regex::Regex;

/// Date layouts recognised inside a site URL, in detection order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// `2024-01/15`
    DashMonthSlashDay,
    /// `202401/15`
    CompactMonthSlashDay,
    /// `2024/01/15`
    Slashed,
    /// `20240115`
    Compact,
}

impl DateLayout {
    const DETECTION_ORDER: [DateLayout; 4] = [
        DateLayout::DashMonthSlashDay,
        DateLayout::CompactMonthSlashDay,
        DateLayout::Slashed,
        DateLayout::Compact,
    ];

    fn pattern(self) -> &'static str {
        match self {
            Self::DashMonthSlashDay => r"\d{4}-\d{2}/\d{2}",
            Self::CompactMonthSlashDay => r"\d{6}/\d{2}",
            Self::Slashed => r"\d{4}/\d{2}/\d{2}",
            Self::Compact => r"\d{8}",
        }
    }

    /// chrono format string producing this layout
    pub fn format(self) -> &'static str {
        match self {
            Self::DashMonthSlashDay => "%Y-%m/%d",
            Self::CompactMonthSlashDay => "%Y%m/%d",
            Self::Slashed => "%Y/%m/%d",
            Self::Compact => "%Y%m%d",
        }
    }
}

/// A site URL with a detected date that can be re-rendered for any day
#[derive(Debug, Clone)]
pub struct DateTemplate {
    template: String,
    sample: String,
    layout: DateLayout,
}

impl DateTemplate {
    /// Detects the first recognised date layout in `template`
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use paper_trawl::url::DateTemplate;
    ///
    /// let t = DateTemplate::detect("https://p.example.com/html/2024-01/15/node_1.html").unwrap();
    /// let day = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
    /// assert_eq!(t.expand(day), "https://p.example.com/html/2024-02/03/node_1.html");
    /// ```
    pub fn detect(template: &str) -> Result<Self, UrlError> {
        for layout in DateLayout::DETECTION_ORDER {
            let regex = Regex::new(layout.pattern())
                .map_err(|e| UrlError::Parse(format!("invalid date pattern: {}", e)))?;
            if let Some(found) = regex.find(template) {
                return Ok(Self {
                    template: template.to_string(),
                    sample: found.as_str().to_string(),
                    layout,
                });
            }
        }

        Err(UrlError::NoDatePattern(template.to_string()))
    }

    /// The detected layout
    pub fn layout(&self) -> DateLayout {
        self.layout
    }

    /// The date text found in the template
    pub fn sample(&self) -> &str {
        &self.sample
    }

    /// Renders the template for `date`, replacing every occurrence of the sample date
    pub fn expand(&self, date: NaiveDate) -> String {
        let rendered = date.format(self.layout.format()).to_string();
        self.template.replace(&self.sample, &rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_detect_dash_month_slash_day() {
        let t = DateTemplate::detect("https://a.example.com/html/2023-12/01/node_1.html").unwrap();
        assert_eq!(t.layout(), DateLayout::DashMonthSlashDay);
        assert_eq!(t.sample(), "2023-12/01");
        assert_eq!(
            t.expand(day(2024, 3, 9)),
            "https://a.example.com/html/2024-03/09/node_1.html"
        );
    }

    #[test]
    fn test_detect_compact_month_slash_day() {
        let t = DateTemplate::detect("https://a.example.com/pc/layout/202312/01/node_01.html").unwrap();
        assert_eq!(t.layout(), DateLayout::CompactMonthSlashDay);
        assert_eq!(
            t.expand(day(2024, 1, 31)),
            "https://a.example.com/pc/layout/202401/31/node_01.html"
        );
    }

    #[test]
    fn test_detect_slashed() {
        let t = DateTemplate::detect("https://a.example.com/2023/12/01/node_A1.html").unwrap();
        assert_eq!(t.layout(), DateLayout::Slashed);
        assert_eq!(
            t.expand(day(2024, 2, 29)),
            "https://a.example.com/2024/02/29/node_A1.html"
        );
    }

    #[test]
    fn test_detect_compact() {
        let t = DateTemplate::detect("https://a.example.com/epaper/20231201/node_1.html").unwrap();
        assert_eq!(t.layout(), DateLayout::Compact);
        assert_eq!(
            t.expand(day(2024, 1, 2)),
            "https://a.example.com/epaper/20240102/node_1.html"
        );
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let t = DateTemplate::detect("https://a.example.com/20231201/page_20231201.html").unwrap();
        assert_eq!(
            t.expand(day(2024, 5, 6)),
            "https://a.example.com/20240506/page_20240506.html"
        );
    }

    #[test]
    fn test_no_date_pattern() {
        let result = DateTemplate::detect("https://a.example.com/latest/node_1.html");
        assert!(matches!(result, Err(UrlError::NoDatePattern(_))));
    }
}
