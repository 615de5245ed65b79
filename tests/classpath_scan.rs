//! End-to-end scans over real directories and archives.

use pkgscan::filter::{FnFilter, PatternFilter, Selection};
use pkgscan::output::export_header;
use pkgscan::pattern::{LiteralCompiler, WildcardCompiler};
use pkgscan::scanner::{ClasspathLocator, ResourceLocator};
use pkgscan::version::{IdentityConverter, VersionMapping};
use pkgscan::{ExportPackage, PackageScanner, RecordingReporter, ScanConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_jar(path: &Path, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
        } else {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap();
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

fn versions(packages: &[ExportPackage]) -> Vec<(&str, Option<&str>)> {
    packages.iter().map(|p| (p.name(), p.version())).collect()
}

fn scan_single_jar(file_name: &str) -> Vec<ExportPackage> {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join(file_name);
    write_jar(&jar, &[("foo/", ""), ("foo/Foo.class", ""), ("foo/Bar.class", "")]);

    let reporter = Arc::new(RecordingReporter::new());
    let report = PackageScanner::for_classpath([jar])
        .with_reporter(reporter.clone())
        .with_roots(["foo"])
        .scan();

    assert!(reporter.events().is_empty(), "{:?}", reporter.events());
    report.packages
}

#[test]
fn test_plus_in_archive_name() {
    let packages = scan_single_jar("foo+bar.jar");
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].name(), "foo");
    assert_eq!(packages[0].origin_name(), "foo+bar.jar");
}

#[test]
fn test_multiple_pluses_in_archive_name() {
    let packages = scan_single_jar("foo+bar+baz.jar");
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].name(), "foo");
}

#[test]
fn test_space_in_archive_name() {
    let packages = scan_single_jar("bar baz.jar");
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].name(), "foo");
}

#[test]
fn test_located_archive_urls_are_encoded() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("with space+plus.jar");
    write_jar(&jar, &[("foo/Foo.class", "")]);

    let reporter = RecordingReporter::new();
    let found = ClasspathLocator::new([&jar]).locate("foo", &reporter).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("with%20space+plus.jar!/foo"), "{}", found[0]);
}

#[test]
fn test_remote_archive_yields_nothing() {
    let reporter = Arc::new(RecordingReporter::new());
    let scanner = PackageScanner::for_classpath(Vec::<PathBuf>::new()).with_reporter(reporter.clone());

    let report = scanner.scan_locations(&["jar:http://www.example.com/foo.jar!/foo"]);

    assert!(report.packages.is_empty());
    assert_eq!(reporter.failed_locations().len(), 1);
}

#[test]
fn test_lib_and_classes_with_mapping() {
    let tmp = TempDir::new().unwrap();
    let lib = tmp.path().join("scanbase/lib");
    let classes = tmp.path().join("scanbase/classes");
    write_jar(&lib.join("dude-1.0.jar"), &[("pkg/in/jar/Dude.class", "")]);
    touch(&classes.join("pkg/in/dir/Swan.class"));

    let scanner = PackageScanner::for_classpath(Vec::<PathBuf>::new())
        .select(FnFilter::new(|_: &str| true, |_: &str| true))
        .with_mappings(vec![VersionMapping::new(&WildcardCompiler, "pkg.in.dir")
            .unwrap()
            .to_version("1.1")]);
    let report = scanner.scan_locations(&[
        lib.display().to_string(),
        url::Url::from_file_path(&classes).unwrap().to_string(),
    ]);

    assert_eq!(
        versions(&report.packages),
        vec![("pkg.in.dir", Some("1.1.0")), ("pkg.in.jar", Some("1.0.0"))]
    );
    assert!(report.conflicts.is_empty());
}

#[test]
fn test_directory_children() {
    let tmp = TempDir::new().unwrap();
    touch(&tmp.path().join("parent/child/foo.class"));
    touch(&tmp.path().join("parent/child/bfoo"));

    let report = PackageScanner::for_classpath([tmp.path()])
        .with_roots(["parent"])
        .scan();

    assert_eq!(versions(&report.packages), vec![("parent.child", None)]);
}

#[test]
fn test_many_entries_one_package() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("big-3.2.1.jar");
    let names: Vec<String> = (0..200).map(|i| format!("org/big/Class{i}.class")).collect();
    let entries: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "")).collect();
    write_jar(&jar, &entries);

    let report = PackageScanner::for_classpath([jar]).scan();
    assert_eq!(versions(&report.packages), vec![("org.big", Some("3.2.1"))]);
}

#[test]
fn test_metadata_resolution_order() {
    let tmp = TempDir::new().unwrap();
    let lib = tmp.path().join("lib");
    write_jar(
        &lib.join("manifest-9.9.jar"),
        &[
            ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\r\nBundle-Version: 4.1\r\n\r\n"),
            ("META-INF/maven/g/manifest/pom.properties", "version=7.0\n"),
            ("with/manifest/A.class", ""),
        ],
    );
    write_jar(
        &lib.join("pom-9.9.jar"),
        &[
            ("META-INF/maven/g/pom/pom.properties", "#generated\nversion=2.5-SNAPSHOT\n"),
            ("with/pom/A.class", ""),
        ],
    );
    write_jar(&lib.join("name-1.6.jar"), &[("with/name/A.class", "")]);
    write_jar(&lib.join("nothing.jar"), &[("with/nothing/A.class", "")]);

    let filter = PatternFilter::new(
        Selection::new(&WildcardCompiler, &["with.*"], &[]).unwrap(),
        Selection::new(&WildcardCompiler, &["*.jar"], &[]).unwrap(),
    );
    let report = PackageScanner::for_classpath([&lib]).select(filter).scan();

    assert_eq!(
        versions(&report.packages),
        vec![
            ("with.manifest", Some("4.1.0")),
            ("with.name", Some("1.6.0")),
            ("with.nothing", Some("0.0.0")),
            ("with.pom", Some("2.5.0.SNAPSHOT")),
        ]
    );
}

#[test]
fn test_identity_converter_keeps_raw_tokens() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("xmlrpc-2.0+xmlrpc61.jar");
    write_jar(&jar, &[("org/xmlrpc/A.class", "")]);

    let report = PackageScanner::for_classpath([jar])
        .with_converter(Box::new(IdentityConverter))
        .scan();
    assert_eq!(
        versions(&report.packages),
        vec![("org.xmlrpc", Some("2.0+xmlrpc61"))]
    );
}

#[test]
fn test_last_mapping_wins_over_metadata() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("commons-logging-1.1.jar");
    write_jar(
        &jar,
        &[
            ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\nImplementation-Version: 1.1\n"),
            ("org/apache/commons/logging/Log.class", ""),
            ("org/apache/commons/logging/impl/Impl.class", ""),
        ],
    );

    let report = PackageScanner::for_classpath([jar])
        .with_mappings(vec![
            VersionMapping::new(&WildcardCompiler, "org.apache.commons.logging*")
                .unwrap()
                .to_version("1.0.4"),
            VersionMapping::new(&LiteralCompiler, "org.apache.commons.logging.impl")
                .unwrap()
                .to_version("1.0.4-patched")
                .without_normalization(),
        ])
        .scan();

    assert_eq!(
        versions(&report.packages),
        vec![
            ("META-INF", Some("1.1.0")),
            ("org.apache.commons.logging", Some("1.0.4")),
            ("org.apache.commons.logging.impl", Some("1.0.4-patched")),
        ]
    );
}

#[test]
fn test_duplicates_across_locations() {
    let tmp = TempDir::new().unwrap();
    let classes = tmp.path().join("classes");
    touch(&classes.join("shared/A.class"));
    let jar = tmp.path().join("shared-2.0.jar");
    write_jar(&jar, &[("shared/A.class", "")]);

    let reporter = Arc::new(RecordingReporter::new());
    let report = PackageScanner::for_classpath([jar, classes])
        .with_reporter(reporter.clone())
        .scan();

    // The unversioned directory copy does not displace the archive's.
    assert_eq!(versions(&report.packages), vec![("shared", Some("2.0.0"))]);
    assert_eq!(report.conflicts.len(), 1);
    assert!(!report.conflicts[0].replaced);
    assert_eq!(reporter.conflicts().len(), 1);
}

#[test]
fn test_scan_from_config() {
    let tmp = TempDir::new().unwrap();
    let lib = tmp.path().join("lib");
    write_jar(&lib.join("api-1.0.jar"), &[("org/api/A.class", ""), ("com/intellij/B.class", "")]);
    write_jar(&lib.join("api-1.0-sources.zip"), &[("org/sources/A.java", "")]);

    let config_path = tmp.path().join("pkgscan.toml");
    fs::write(
        &config_path,
        format!(
            r#"
classpath = [{:?}]

[packages]
include = ["org.*", "com.*"]
exclude = ["com.intellij*"]

[[mappings]]
package = "org.api"
version = "5"
"#,
            lib.display().to_string()
        ),
    )
    .unwrap();

    let config = ScanConfig::load_from(&config_path).unwrap();
    let report = PackageScanner::from_config(&config).unwrap().scan();

    assert_eq!(
        export_header(&report.packages),
        r#"org.api;version="5.0.0""#
    );
}

#[test]
fn test_missing_classpath_directory_from_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("target/classes");
    let config = ScanConfig {
        classpath: vec![missing.clone()],
        ..ScanConfig::default()
    };

    let reporter = Arc::new(RecordingReporter::new());
    let report = PackageScanner::from_config(&config)
        .unwrap()
        .with_reporter(reporter.clone())
        .scan();

    assert!(report.packages.is_empty());
    assert_eq!(reporter.failed_locations(), vec![missing.display().to_string()]);
}
