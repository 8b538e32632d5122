use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use scriptfcns::{compile, CompileOptions, CompilerError, HeaderFlavor, Mode};

const POINT: &str = "\
@NAMESPACE Gfx
@{
    @CLASS Point
    @{
        @CONSTRUCTOR (Integer x, Integer y)
        @{
            @RETURN NewPoint(Script, @CLASSPTR, x, y);
        @}
        @FUNCTION Integer X ()
        @{
            @RETURN ((tPoint*)this)->X;
        @}
    @}
@}
";

const STRINGS: &str = "\
@NAMESPACE Lang
@{
    @FUNCTION Integer Length (String s)
    @{
        @RETURN s ? s->Length : 0;
    @}
    @FUNCTION void Print (String fmt, ...)
    @{
        @RETURN;
    @}
@}
";

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn code_mode_writes_translation_unit() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "point.ssf", POINT);
    let output = dir.path().join("point.c");

    let mut options = CompileOptions::new(Mode::Code, vec![input], &output);
    options.header = Some("exports.gen.h".to_string());
    let result = compile(&options).unwrap();
    assert!(result.written);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("#include <exports.gen.h>\n"));
    assert!(text.contains("extern tSpiderClass gExports_class_Gfx_Point;\n"));
    assert!(text.contains("            return NewPoint(Script, &gExports_class_Gfx_Point, x, y);\n"));
    assert!(text.contains("            do{*(tSpiderInteger*)RetData = (((tPoint*)this)->X);return 0;}while(0);\n"));
    assert!(text.contains("    tSpiderClass gExports_class_Gfx_Point = {\n"));
    assert!(!dir.path().join("point.c.tmp").exists());
}

#[test]
fn header_mode_aggregates_inputs_in_order() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "point.ssf", POINT);
    let b = write(dir.path(), "strings.ssf", STRINGS);
    let output = dir.path().join("exports.gen.h");

    let mut options = CompileOptions::new(Mode::Header, vec![a, b], &output);
    options.flavor = HeaderFlavor::Language;
    compile(&options).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "SS_EXPORT extern tSpiderClass gExports_class_Gfx_Point;\n\
         #define TYPE_Gfx_z_Point &gExports_class_Gfx_Point.TypeDef\n"
    );
}

#[test]
fn index_mode_expands_directories() {
    let dir = TempDir::new().unwrap();
    let sources = dir.path().join("src");
    fs::create_dir(&sources).unwrap();
    write(&sources, "b_strings.ssf", STRINGS);
    write(&sources, "a_point.ssf", POINT);
    write(&sources, "notes.txt", "@FUNCTION broken");
    let output = dir.path().join("index.c");

    let mut options = CompileOptions::new(Mode::Index, vec![sources], &output);
    options.header = Some("exports.gen.h".to_string());
    compile(&options).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("#include \"exports.gen.h\"\n"));
    assert!(text.contains("int giNumExportedClasses = 1;\n"));
    assert!(text.contains("int giNumExportedFunctions = 2;\n"));
    assert!(text.contains(
        "tSpiderFunction *gapExportedFunctions[] = {\n\
         \t&gExports_fcn_Lang_Length,\n\
         \t&gExports_fcn_Lang_Print,\n\
         \tNULL\n};"
    ));
    assert!(text.ends_with("};\n\n"));
}

#[test]
fn manifest_mode_emits_json() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "strings.ssf", STRINGS);
    let output = dir.path().join("exports.json");

    compile(&CompileOptions::new(Mode::Manifest, vec![input], &output)).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["functionCount"], 2);
    assert_eq!(value["functions"][1]["name"], "Lang@Print");
    assert_eq!(value["functions"][1]["variadic"], true);
}

#[test]
fn syntax_error_leaves_output_untouched() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "bad.ssf", "@FUNCTION void f ()\n@{\n@}\n@}\n");
    let output = write(dir.path(), "bad.c", "previous contents");

    let err = compile(&CompileOptions::new(Mode::Code, vec![input], &output)).unwrap_err();
    match &err {
        CompilerError::Syntax { line, reason, .. } => {
            assert_eq!(*line, 4);
            assert_eq!(reason, "Unbalanced @}");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().ends_with("bad.ssf:4: Syntax Error: Unbalanced @}"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous contents");
}

#[test]
fn code_mode_takes_one_input() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "point.ssf", POINT);
    let b = write(dir.path(), "strings.ssf", STRINGS);
    let output = dir.path().join("out.c");

    let err = compile(&CompileOptions::new(Mode::Code, vec![a, b], &output)).unwrap_err();
    assert!(matches!(err, CompilerError::Usage(_)));
    assert!(!output.exists());
}

#[test]
fn missing_input_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.c");
    let options = CompileOptions::new(Mode::Code, vec![dir.path().join("missing.ssf")], &output);
    assert!(matches!(compile(&options), Err(CompilerError::Read { .. })));
}

#[test]
fn cache_skips_unchanged_inputs() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "strings.ssf", STRINGS);
    let output = dir.path().join("index.c");

    let mut options = CompileOptions::new(Mode::Index, vec![input.clone()], &output);
    options.cache_dir = Some(dir.path().join("cache"));

    assert!(compile(&options).unwrap().written);
    assert!(!compile(&options).unwrap().written);

    // Changing an option invalidates the entry
    options.header = Some("other.h".to_string());
    assert!(compile(&options).unwrap().written);

    // So does changing an input
    fs::write(&input, STRINGS.replace("Print", "Log")).unwrap();
    assert!(compile(&options).unwrap().written);
    assert!(fs::read_to_string(&output).unwrap().contains("gExports_fcn_Lang_Log"));
}

#[test]
fn aggregation_rejects_declarations_repeated_across_inputs() {
    let dir = TempDir::new().unwrap();
    let unit = "@CLASS Point\n@{\n@}\n@FUNCTION void f ()\n@{\n@}\n";
    let a = write(dir.path(), "a.ssf", unit);
    let b = write(dir.path(), "b.ssf", unit);
    let output = dir.path().join("index.c");

    let err = compile(&CompileOptions::new(Mode::Index, vec![a, b], &output)).unwrap_err();
    match &err {
        CompilerError::Syntax { file, line, reason, source_line } => {
            assert!(file.ends_with("b.ssf"));
            assert_eq!(*line, 1);
            assert_eq!(reason, "Duplicate class 'Point'");
            assert_eq!(source_line, "@CLASS Point");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!output.exists());

    // Only the global function repeats
    let c = write(dir.path(), "c.ssf", "@CLASS Size\n@{\n@}\n@FUNCTION void f ()\n@{\n@}\n");
    let a = dir.path().join("a.ssf");
    let err = compile(&CompileOptions::new(Mode::Header, vec![a, c], &output)).unwrap_err();
    assert!(err.to_string().ends_with("c.ssf:4: Syntax Error: Duplicate function 'f'"));
}
