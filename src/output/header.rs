use crate::model::{ExportPackage, ScanReport};
use anyhow::Result;

/// Renders packages as an OSGi `Export-Package` header value.
///
/// ```
/// use pkgscan::output::export_header;
/// use pkgscan::ExportPackage;
///
/// let packages = vec![
///     ExportPackage::new("pkg.a", Some("1.2.3.4".into()), "a.jar"),
///     ExportPackage::new("pkg.b", None, "classes"),
/// ];
/// assert_eq!(export_header(&packages), r#"pkg.a;version="1.2.3.4",pkg.b"#);
/// ```
pub fn export_header(packages: &[ExportPackage]) -> String {
    packages
        .iter()
        .map(|p| match p.version() {
            Some(version) => format!("{};version=\"{}\"", p.name(), version),
            None => p.name().to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub fn print_header(report: &ScanReport) -> Result<()> {
    println!("{}", export_header(&report.packages));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_header() {
        assert_eq!(export_header(&[]), "");
    }

    #[test]
    fn test_single_versioned_package() {
        let packages = [ExportPackage::new("org.example", Some("2.0.0".into()), "x.jar")];
        assert_eq!(export_header(&packages), "org.example;version=\"2.0.0\"");
    }
}
