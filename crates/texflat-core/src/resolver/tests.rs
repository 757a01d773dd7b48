use super::*;
use crate::fs::MemoryFs;
use std::io;

fn expand_with(fs: &dyn SourceFs, main: &str, config: &InlinerConfig) -> (String, ExpansionReport) {
    let main_path = Path::new(main);
    let root_dir = main_path.parent().unwrap();
    let mut ctx = ExpansionContext::new(root_dir);
    ctx.mark_visited(fs.canonicalize(main_path));
    let content = fs.read_source(main_path).unwrap();
    let out = Resolver::new(fs, config).resolve(&content, root_dir, &mut ctx);
    (out, ctx.into_report())
}

fn expand(fs: &dyn SourceFs, main: &str) -> (String, ExpansionReport) {
    expand_with(fs, main, &InlinerConfig::default())
}

/// Serves files from a [`MemoryFs`] but fails to read one path.
#[derive(Debug)]
struct FailingFs {
    inner: MemoryFs,
    broken: PathBuf,
}

impl SourceFs for FailingFs {
    fn exists(&self, path: &Path) -> bool {
        path == self.broken || self.inner.exists(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if path == self.broken {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        } else {
            self.inner.read(path)
        }
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.inner.write(path, content)
    }
}

#[test]
fn test_no_directives_is_identity() {
    let text = "Some $x$ text\n\n\\begin{align}\na\n\\end{align}\n";
    let fs = MemoryFs::new().with_file("proj/main.tex", text);
    let (out, report) = expand(&fs, "proj/main.tex");
    assert_eq!(out, text);
    assert!(report.inlined.is_empty());
    assert!(report.incidents.is_empty());
    assert_eq!(report.files_processed, 1);
}

#[test]
fn test_text_mode_inclusion() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "Before\n\\input{sub}\nAfter\n")
        .with_file("proj/sub.tex", "x = 1\n");
    let (out, report) = expand(&fs, "proj/main.tex");
    assert_eq!(
        out,
        "Before\n% --- Begin included file: sub.tex ---\nx = 1\n% --- End included file: sub.tex ---\n\nAfter\n"
    );
    assert_eq!(
        report.inlined,
        vec![InlinedFile {
            path: PathBuf::from("proj/sub.tex"),
            in_math_mode: false,
            depth: 1,
        }]
    );
    assert_eq!(report.files_processed, 2);
}

#[test]
fn test_math_mode_inclusion() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "$\\input{formula}$")
        .with_file("proj/formula.tex", "\n  x^2\n\n");
    let (out, report) = expand(&fs, "proj/main.tex");
    assert_eq!(out, "$% Inline: formula.tex\nx^2\n% End: formula.tex\n$");
    assert!(report.inlined[0].in_math_mode);
}

#[test]
fn test_math_mode_is_decided_per_directive() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "$a$ \\input{x} $\\input{y}$")
        .with_file("proj/x.tex", "plain")
        .with_file("proj/y.tex", "y^2");
    let (out, report) = expand(&fs, "proj/main.tex");
    assert_eq!(
        out,
        "$a$ \n% --- Begin included file: x.tex ---\nplain\n% --- End included file: x.tex ---\n $% Inline: y.tex\ny^2\n% End: y.tex\n$"
    );
    let modes: Vec<bool> = report.inlined.iter().map(|f| f.in_math_mode).collect();
    assert_eq!(modes, vec![false, true]);
}

#[test]
fn test_text_banner_starts_on_its_own_line() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "Hello \\input{name}. \\input{name2}\n\\input{gone}\n")
        .with_file("proj/name.tex", "World\n")
        .with_file("proj/name2.tex", "Again");
    let (out, _) = expand(&fs, "proj/main.tex");
    assert_eq!(
        out,
        "Hello \n% --- Begin included file: name.tex ---\nWorld\n% --- End included file: name.tex ---\n. \n\
         % --- Begin included file: name2.tex ---\nAgain\n% --- End included file: name2.tex ---\n\n\
         \\input{gone}\n"
    );
    for line in out.lines().filter(|l| l.contains("included file")) {
        assert!(line.starts_with("% ---"), "banner shares a line: {line:?}");
    }
}

#[test]
fn test_include_with_options() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "\\include[draft]{chapter.tex}")
        .with_file("proj/chapter.tex", "Chapter body\n");
    let (out, _) = expand(&fs, "proj/main.tex");
    assert!(out.contains("Chapter body"));
    assert!(!out.contains("\\include"));
}

#[test]
fn test_unresolved_directive_is_kept() {
    let fs = MemoryFs::new().with_file("proj/main.tex", "A \\input{missing} B");
    let (out, report) = expand(&fs, "proj/main.tex");
    assert_eq!(out, "A \\input{missing} B");
    assert_eq!(report.incidents.len(), 1);
    assert_eq!(report.incidents[0].kind, IncidentKind::Unresolved);
    assert_eq!(report.incidents[0].directive, "\\input{missing}");
}

#[test]
fn test_path_fallbacks() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "\\input{chapters/one}")
        .with_file(
            "proj/chapters/one.tex",
            "\\input{figs/plot}\n\\input{shared/defs}\n\\input{elsewhere/notes}\n",
        )
        .with_file("proj/chapters/figs/plot.tex", "PLOT")
        .with_file("proj/shared/defs.tex", "DEFS")
        .with_file("proj/notes.tex", "NOTES");
    let (out, report) = expand(&fs, "proj/main.tex");

    for text in ["PLOT", "DEFS", "NOTES"] {
        assert!(out.contains(text), "missing {text} in {out}");
    }
    let paths: Vec<PathBuf> = report.inlined.iter().map(|f| f.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("proj/chapters/one.tex"),
            PathBuf::from("proj/chapters/figs/plot.tex"),
            PathBuf::from("proj/shared/defs.tex"),
            PathBuf::from("proj/notes.tex"),
        ]
    );
    assert!(report.incidents.is_empty());
}

#[test]
fn test_self_inclusion_terminates() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "\\input{loop}")
        .with_file("proj/loop.tex", "again \\input{loop}");
    let (out, report) = expand(&fs, "proj/main.tex");
    assert_eq!(out.matches("Circular include prevented").count(), 1);
    assert_eq!(report.incidents_of(IncidentKind::Circular).count(), 1);
}

#[test]
fn test_cycle_back_to_root() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "\\input{a}\n")
        .with_file("proj/a.tex", "A\n\\input{main}\n");
    let (out, _) = expand(&fs, "proj/main.tex");
    assert!(out.contains("\n% Circular include prevented: \\input{main}\n"));
    assert_eq!(out.matches("Circular include prevented").count(), 1);
}

#[test]
fn test_cycle_marker_in_math_has_no_padding() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "\\input{m}")
        .with_file("proj/m.tex", "\\[ \\input{m} \\]");
    let (out, _) = expand(&fs, "proj/main.tex");
    assert!(out.contains("\\[ % Circular include prevented: \\input{m}\n \\]"));
}

#[test]
fn test_repeated_sibling_is_inlined_once() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "\\input{a}\n\\input{a}\n")
        .with_file("proj/a.tex", "A\n");
    let (out, report) = expand(&fs, "proj/main.tex");
    assert_eq!(out.matches("A\n% --- End").count(), 1);
    assert_eq!(report.inlined.len(), 1);
    assert_eq!(report.incidents_of(IncidentKind::Circular).count(), 1);
}

#[test]
fn test_depth_ceiling() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "\\input{f1}")
        .with_file("proj/f1.tex", "one \\input{f2}")
        .with_file("proj/f2.tex", "two \\input{f3}")
        .with_file("proj/f3.tex", "three \\input{f4}")
        .with_file("proj/f4.tex", "four");
    let config = InlinerConfig {
        max_depth: 2,
        ..InlinerConfig::default()
    };
    let (out, report) = expand_with(&fs, "proj/main.tex", &config);

    assert!(out.contains("three \\input{f4}"));
    assert!(!out.contains("four"));
    let depths: Vec<usize> = report.inlined.iter().map(|f| f.depth).collect();
    assert_eq!(depths, vec![1, 2, 3]);
    assert_eq!(report.incidents_of(IncidentKind::DepthExceeded).count(), 1);
}

#[test]
fn test_read_failure_is_isolated() {
    let fs = FailingFs {
        inner: MemoryFs::new()
            .with_file("proj/main.tex", "a\n\\input{locked}\nb\n\\input{ok}\n")
            .with_file("proj/ok.tex", "fine\n"),
        broken: PathBuf::from("proj/locked.tex"),
    };
    let (out, report) = expand(&fs, "proj/main.tex");

    assert!(out.starts_with("a\n\n% Error including proj/locked.tex: denied\n\\input{locked}\n\nb\n"));
    assert!(out.contains("fine\n% --- End included file: ok.tex ---"));
    assert_eq!(report.incidents_of(IncidentKind::ReadFailure).count(), 1);
    assert_eq!(report.inlined.len(), 1);
}

#[test]
fn test_read_failure_in_math_mode() {
    let fs = FailingFs {
        inner: MemoryFs::new().with_file("proj/main.tex", "$\\input{locked}$"),
        broken: PathBuf::from("proj/locked.tex"),
    };
    let (out, _) = expand(&fs, "proj/main.tex");
    assert_eq!(out, "$% Error including proj/locked.tex: denied\n\\input{locked}$");
}

#[test]
fn test_latin1_inclusion() {
    let fs = MemoryFs::new()
        .with_file("proj/main.tex", "\\input{accents}")
        .with_file("proj/accents.tex", vec![b'c', b'a', b'f', 0xE9, b'\n']);
    let (out, _) = expand(&fs, "proj/main.tex");
    assert!(out.contains("café\n"));
}

#[test]
fn test_custom_extension() {
    let fs = MemoryFs::new()
        .with_file("proj/main.ltx", "\\input{part}")
        .with_file("proj/part.ltx", "PART");
    let config = InlinerConfig {
        extension: "ltx".to_string(),
        ..InlinerConfig::default()
    };
    let (out, _) = expand_with(&fs, "proj/main.ltx", &config);
    assert!(out.contains("PART"));
}
