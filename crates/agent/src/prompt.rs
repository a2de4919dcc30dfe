//! System prompt and project context.

use std::fmt::Write as _;
use std::path::Path;

use orangutan_core::tool::ToolRegistry;
use orangutan_tools::walk::is_ignored_name;

/// Depth of the directory tree embedded in the system prompt.
pub const TREE_DEPTH: usize = 4;

const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

pub const REPORT_START: &str = "--- EXECUTION REPORT ---";
pub const REPORT_END: &str = "--- END REPORT ---";

/// Render the project tree with box-drawing connectors, directories first.
///
/// Unreadable directories are shown but not descended into.
pub fn build_directory_tree(root: &Path, max_depth: usize) -> String {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut lines = vec![format!("{name}/")];
    walk_tree(root, "", 0, max_depth, &mut lines);
    lines.join("\n")
}

fn walk_tree(dir: &Path, prefix: &str, depth: usize, max_depth: usize, lines: &mut Vec<String>) {
    if depth >= max_depth {
        return;
    }
    let Ok(read) = std::fs::read_dir(dir) else {
        return;
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in read.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() {
            if !is_ignored_name(&name) && !name.ends_with(".egg-info") {
                dirs.push(name);
            }
        } else if !IGNORED_FILES.contains(&name.as_str()) {
            files.push(name);
        }
    }
    dirs.sort();
    files.sort();

    let total = dirs.len() + files.len();
    let entries = dirs
        .into_iter()
        .map(|d| (d, true))
        .chain(files.into_iter().map(|f| (f, false)));

    for (i, (name, is_dir)) in entries.enumerate() {
        let last = i + 1 == total;
        let connector = if last { "└── " } else { "├── " };
        if is_dir {
            lines.push(format!("{prefix}{connector}{name}/"));
            let extension = if last { "    " } else { "│   " };
            walk_tree(
                &dir.join(&name),
                &format!("{prefix}{extension}"),
                depth + 1,
                max_depth,
                lines,
            );
        } else {
            lines.push(format!("{prefix}{connector}{name}"));
        }
    }
}

/// Assemble the system prompt: identity and ground rules, the tool-call
/// protocol, one line per tool, the report format, then project context.
pub fn build_system_prompt(root: &Path, registry: &ToolRegistry, memory: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are Orangutan Code, a terminal coding assistant working inside the \
         developer's project.\n\
         Be technical and direct. Reference code by file path and symbol name.\n\
         The developer makes every design decision: when a choice is not obvious, \
         or before changing files or running commands, ask with ask_user.\n\
         Read a file before editing it. Do only what was requested.\n",
    );

    prompt.push_str(
        "\n## Tool Format\n\
         Call a tool by writing a JSON object inside tool tags, exactly like this:\n\
         <tool>\n{\"tool\": \"tool_name\", \"params\": {...}}\n</tool>\n\
         Several tool blocks may appear in one response; they run in order. \
         Their results come back in the next message.\n",
    );

    prompt.push_str("\n## Available Tools\n");
    for def in registry.definitions() {
        let _ = writeln!(
            prompt,
            "- {}({}): {}",
            def.name,
            param_names(&def.parameters).join(", "),
            def.description
        );
    }

    let _ = write!(
        prompt,
        "\n## Execution Report\n\
         When the task is finished and no tool calls remain, end with a report between \
         the lines `{REPORT_START}` and `{REPORT_END}`, listing actions, files touched \
         and commands run. Wrap file paths and symbols in << and >>, e.g. <<src/main.rs>>.\n"
    );

    let _ = write!(
        prompt,
        "\n## Current Project\nWorking directory: {}\n\n### Directory Structure:\n```\n{}\n```\n",
        root.display(),
        build_directory_tree(root, TREE_DEPTH)
    );

    if let Some(memory) = memory.filter(|m| !m.trim().is_empty()) {
        let _ = write!(
            prompt,
            "\n## Project Memory (orangutan.md)\n\
             Keep it current with update_config when you learn a lasting project fact.\n\n{}\n",
            memory.trim_end()
        );
    }

    prompt
}

/// Parameter names from a JSON Schema, required ones first, optional ones
/// suffixed with `?`.
fn param_names(schema: &serde_json::Value) -> Vec<String> {
    let required: Vec<&str> = schema["required"]
        .as_array()
        .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let mut names: Vec<String> = required.iter().map(|s| s.to_string()).collect();
    if let Some(props) = schema["properties"].as_object() {
        names.extend(
            props
                .keys()
                .filter(|k| !required.contains(&k.as_str()))
                .map(|k| format!("{k}?")),
        );
    }
    names
}
