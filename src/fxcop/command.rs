use std::collections::HashSet;
use std::path::Path;

use super::config::FxCopConfig;

/// Builds the FxCopCmd switches for `config`, writing the report to
/// `report`. `tool_dir` supplies the default rule directory.
pub fn build_arguments(config: &FxCopConfig, report: &Path, tool_dir: &Path) -> Vec<String> {
    let mut args = Vec::new();

    args.push(format!("/outputCulture:{}", config.output_culture));
    args.push(format!("/out:{}", quote(report)));
    if let Some(project) = &config.project {
        args.push(format!("/project:{}", quote(project)));
    }
    if config.update_project {
        args.push("/update".to_string());
    }
    for assembly in &config.assemblies {
        args.push(format!("/file:{}", quote(assembly)));
    }
    for dictionary in &config.dictionaries {
        args.push(format!("/dictionary:{}", quote(dictionary)));
    }
    if let Some(xsl) = &config.log_file_xsl {
        args.push(format!("/outxsl:{}", quote(xsl)));
    }
    if config.apply_log_file_xsl {
        args.push("/applyoutxsl".to_string());
    }
    if let Some(platform) = &config.platform_path {
        args.push(format!("/platform:{}", quote(platform)));
    }
    for dir in &config.dependent_assembly_paths {
        args.push(format!("/directory:{}", quote(dir)));
    }
    let mut seen = HashSet::new();
    for reference in &config.references {
        let dir = quote(reference.parent().unwrap_or_else(|| Path::new("")));
        if seen.insert(dir.clone()) {
            args.push(format!("/directory:{dir}"));
        }
    }
    if config.output_to_console {
        args.push("/console".to_string());
    }
    if let Some(xsl) = &config.console_xsl {
        args.push(format!("/consolexsl:{}", quote(xsl)));
    }
    for import in &config.imports {
        args.push(format!("/import:{}", quote(import)));
    }
    match &config.rule_assemblies {
        Some(rules) => {
            for rule in rules {
                args.push(format!("/rule:{}", quote(rule)));
            }
        }
        None => args.push(format!("/rule:{}", quote(&tool_dir.join("Rules")))),
    }
    for rule_id in &config.rules {
        args.push(format!("/ruleid:{rule_id}"));
    }

    let flags = [
        (config.summary, "/summary"),
        (config.quiet, "/quiet"),
        (config.search_global_assembly_cache, "/searchgac"),
        (config.ignore_invalid_targets, "/ignoreinvalidtargets"),
        (config.force_output, "/forceoutput"),
        (config.generate_success_file, "/successfile"),
        (config.ignore_generated_code, "/ignoregeneratedcode"),
    ];
    args.extend(
        flags
            .iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, switch)| switch.to_string()),
    );

    if let Some(culture) = config.culture.as_deref().filter(|c| !c.is_empty()) {
        args.push(format!("/culture:{culture}"));
    }
    if config.override_rule_visibilities {
        args.push("/overriderulevisibilities".to_string());
    }
    if let Some(save) = config
        .save_messages_to_report
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        args.push(format!("/saveMessagesToReport:{save}"));
    }
    args.push(format!("/timeout:{}", config.analysis_timeout));

    args
}

/// Wraps a path in double quotes, dropping any quotes already around it.
pub fn quote(path: &Path) -> String {
    let text = path.to_string_lossy();
    format!("\"{}\"", text.trim_matches('"'))
}
