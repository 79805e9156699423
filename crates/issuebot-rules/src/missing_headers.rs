/// Reply posted before closing an issue that reports missing `Python.h` headers.
pub const REPLY_MISSING_PYTHON_HEADERS: &str = "\
It looks like you're missing `Python.h` headers. This usually means you have \
to install them first, then retry psutil installation.
Please read \
[INSTALL](https://github.com/giampaolo/psutil/blob/master/INSTALL.rst) \
instructions for your platform. \
This is an auto-generated response based on the text you submitted. \
If this was a mistake or you think there's a bug with psutil installation \
process, please add a comment to reopen this issue.
";

const TEXT_SIGNATURES: &[&str] = &[
    "missing python.h",
    "python.h: no such file or directory",
];

// Compiler caret output, compared after removing every space from the body.
const COMPILER_OUTPUT_SIGNATURES: &[&str] = &["#include<Python.h>\n^~~~", "#include<Python.h>\r\n^~~~"];

/// Return the signature proving the reporter lacks the Python development headers.
pub fn detect_missing_python_headers(title: &str, body: &str) -> Option<&'static str> {
    let title_lower = title.to_lowercase();
    let body_lower = body.to_lowercase();
    if let Some(signature) = TEXT_SIGNATURES
        .iter()
        .find(|signature| title_lower.contains(**signature) || body_lower.contains(**signature))
    {
        return Some(*signature);
    }
    let compact_body = body.replace(' ', "");
    COMPILER_OUTPUT_SIGNATURES
        .iter()
        .find(|signature| compact_body.contains(**signature))
        .copied()
}
