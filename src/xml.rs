//! Pure formatting of a [`ParsedPackage`] into the three output streams.
//!
//! Deterministic by construction: the same package value always produces
//! the same three strings, which is what lets cache-reuse and fresh-parse
//! paths agree on output (see the worker loop's reuse handling).

use crate::error::FormatError;
use crate::package::ParsedPackage;

/// The three XML chunks produced for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTriple {
    /// Chunk for the primary stream.
    pub primary: String,
    /// Chunk for the filelists stream.
    pub filelists: String,
    /// Chunk for the other (changelog) stream.
    pub other: String,
}

/// Escapes `&`, `<`, `>`, and `"` for safe inclusion in XML text/attributes.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn location_url(pkg: &ParsedPackage) -> String {
    match &pkg.location_base {
        Some(base) => format!("{base}/{}", pkg.location_href),
        None => pkg.location_href.clone(),
    }
}

fn format_primary(pkg: &ParsedPackage) -> String {
    format!(
        "<package type=\"rpm\">\n  \
         <name>{name}</name>\n  \
         <arch>{arch}</arch>\n  \
         <version epoch=\"{epoch}\" ver=\"{version}\" rel=\"{release}\"/>\n  \
         <checksum type=\"{kind}\" pkgid=\"YES\">{pkg_id}</checksum>\n  \
         <summary>{summary}</summary>\n  \
         <description>{description}</description>\n  \
         <license>{license}</license>\n  \
         <size package=\"{size_package}\" installed=\"{size_installed}\"/>\n  \
         <time file=\"{time_file}\"/>\n  \
         <location href=\"{href}\"/>\n  \
         <format>\n    <header-range start=\"{header_start}\" end=\"{header_end}\"/>\n  </format>\n\
         </package>\n",
        name = escape(&pkg.name),
        arch = escape(&pkg.arch),
        epoch = pkg.epoch,
        version = escape(&pkg.version),
        release = escape(&pkg.release),
        kind = pkg.checksum_kind.name(),
        pkg_id = pkg.pkg_id,
        summary = escape(&pkg.summary),
        description = escape(&pkg.description),
        license = escape(&pkg.license),
        size_package = pkg.size_package,
        size_installed = pkg.size_installed,
        time_file = pkg.time_file,
        href = escape(&location_url(pkg)),
        header_start = pkg.rpm_header_start,
        header_end = pkg.rpm_header_end,
    )
}

fn format_filelists(pkg: &ParsedPackage) -> String {
    let mut out = format!(
        "<package pkgid=\"{pkg_id}\" name=\"{name}\" arch=\"{arch}\">\n  \
         <version epoch=\"{epoch}\" ver=\"{version}\" rel=\"{release}\"/>\n",
        pkg_id = pkg.pkg_id,
        name = escape(&pkg.name),
        arch = escape(&pkg.arch),
        epoch = pkg.epoch,
        version = escape(&pkg.version),
        release = escape(&pkg.release),
    );
    for file in &pkg.files {
        let file_type = if file.is_dir { " type=\"dir\"" } else { "" };
        out.push_str(&format!(
            "  <file{file_type}>{path}</file>\n",
            path = escape(&file.path)
        ));
    }
    out.push_str("</package>\n");
    out
}

fn format_other(pkg: &ParsedPackage) -> String {
    let mut out = format!(
        "<package pkgid=\"{pkg_id}\" name=\"{name}\" arch=\"{arch}\">\n  \
         <version epoch=\"{epoch}\" ver=\"{version}\" rel=\"{release}\"/>\n",
        pkg_id = pkg.pkg_id,
        name = escape(&pkg.name),
        arch = escape(&pkg.arch),
        epoch = pkg.epoch,
        version = escape(&pkg.version),
        release = escape(&pkg.release),
    );
    for entry in &pkg.changelog {
        out.push_str(&format!(
            "  <changelog author=\"{author}\" date=\"{date}\">{text}</changelog>\n",
            author = escape(&entry.author),
            date = entry.timestamp,
            text = escape(&entry.description),
        ));
    }
    out.push_str("</package>\n");
    out
}

/// Formats `pkg` into its three output chunks.
pub fn format_package(pkg: &ParsedPackage) -> Result<XmlTriple, FormatError> {
    if pkg.name.is_empty() {
        return Err(FormatError::MissingField {
            pkg_id: pkg.pkg_id.clone(),
            field: "name",
        });
    }
    Ok(XmlTriple {
        primary: format_primary(pkg),
        filelists: format_filelists(pkg),
        other: format_other(pkg),
    })
}
