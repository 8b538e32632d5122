//! Golden output tests for the emitted C fragments.

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::args::parse_args;
    use crate::codegen::{class_record, function_header, function_trailer, preamble, prototype_record, PROTO_MACRO};
    use crate::compile::{translate_source, SourceFile};
    use crate::decl::{ClassDecl, FunctionDecl, FunctionKind, Receiver};
    use crate::scanner::{ScanMode, Scanner};
    use crate::types::{resolve_type, BaseType, TypeDescriptor};

    fn global(name: &str, ret: &str, args: &str) -> FunctionDecl {
        let list = parse_args(args, 0, None).unwrap();
        FunctionDecl {
            kind: FunctionKind::Global,
            name: name.to_string(),
            symbol: name.to_string(),
            receiver: None,
            params: list.params,
            ret: resolve_type(ret, None).unwrap(),
            variadic: list.variadic,
        }
    }

    fn emit(file: &str, source: &str) -> String {
        let mut scanner = Scanner::new(ScanMode::Emit);
        scanner.process_source(file, source).unwrap();
        scanner.into_output()
    }

    #[test]
    fn test_full_function_translation() {
        let source = "\
@FUNCTION Integer add (Integer a, Integer b)
@{
\t@RETURN a + b;
@}
";
        let expected = "\
#define SS_ERRRET -1
__SFCN_PROTO(Exports_fcn_add);
tSpiderFcnProto gExports_fcnp_add = {
\t.ReturnType={&gSpiderScript_IntegerType,0},.Args={
\t\t{&gSpiderScript_IntegerType,0},
\t\t{&gSpiderScript_IntegerType,0},
\t\t{NULL,0}
\t},
\t.bVariableArgs=0,
};
tSpiderFunction gExports_fcn_add = {
\t.Next=NULL, .Name=\"add\",
\t.Handler=Exports_fcn_add, .Prototype=&gExports_fcnp_add,
};
__SFCN_PROTO(Exports_fcn_add)
{
\t__SS_BUGCHECK(NArgs == 2);
\ttSpiderInteger a = *(tSpiderInteger*const)Args[0];
\t(void)a;
\ttSpiderInteger b = *(tSpiderInteger*const)Args[1];
\t(void)b;
# 2 \"math.ssf\"
# 3 \"math.ssf\"
\tdo{*(tSpiderInteger*)RetData = (a + b);return 0;}while(0);
}
\t#undef SS_ERRRET
";
        assert_eq!(emit("math.ssf", source), expected);
    }

    #[test]
    fn test_templated_class_with_operator() {
        let source = "\
@CLASS List<T>
@{
@OPERATOR T \"[]\" (Integer i)
@{
@RETURN ListGet(this, i);
@}
@FUNCTION void Add (T item)
@{
\tListAppend(this, item, @TYPE(T));
@}
@}
";
        let expected = "\
extern tSpiderClass gExports_class_List;
extern tSpiderScript_TypeDef\tgSpiderScript_TemplateInst;
extern tSpiderScript_TypeDef\tgSpiderScript_TemplateArg0;
# 3 \"list.ssf\"
#define SS_ERRRET -1
__SFCN_PROTO(Exports_fcn_List_operator$index);
tSpiderFcnProto gExports_fcnp_List_operator$index = {
\t.ReturnType={&gSpiderScript_TemplateArg0,0},.Args={
\t\t{&gSpiderScript_TemplateInst,0},
\t\t{&gSpiderScript_IntegerType,0},
\t\t{NULL,0}
\t},
\t.bVariableArgs=0,
};
tSpiderFunction gExports_fcn_List_operator$index = {
\t.Next=NULL, .Name=\"operator []\",
\t.Handler=Exports_fcn_List_operator$index, .Prototype=&gExports_fcnp_List_operator$index,
};
__SFCN_PROTO(Exports_fcn_List_operator$index)
{
\t__SS_BUGCHECK(NArgs == 2);
\tconst tSpiderObject* this = Args[0];
\t(void)this;
\ttSpiderInteger i = *(tSpiderInteger*const)Args[1];
\t(void)i;
# 4 \"list.ssf\"
# 5 \"list.ssf\"
do{*(const void**)RetData = (ListGet(this, i));return 0;}while(0);
}
\t#undef SS_ERRRET
#define SS_ERRRET -1
__SFCN_PROTO(Exports_fcn_List_Add);
tSpiderFcnProto gExports_fcnp_List_Add = {
\t.ReturnType={NULL,0},.Args={
\t\t{&gSpiderScript_TemplateInst,0},
\t\t{&gSpiderScript_TemplateArg0,0},
\t\t{NULL,0}
\t},
\t.bVariableArgs=0,
};
tSpiderFunction gExports_fcn_List_Add = {
\t.Next=&gExports_fcn_List_operator$index, .Name=\"Add\",
\t.Handler=Exports_fcn_List_Add, .Prototype=&gExports_fcnp_List_Add,
};
__SFCN_PROTO(Exports_fcn_List_Add)
{
\t__SS_BUGCHECK(NArgs == 2);
\tconst tSpiderObject* this = Args[0];
\t(void)this;
\tconst void* item = Args[1];
\t(void)item;
# 8 \"list.ssf\"
# 9 \"list.ssf\"
\tListAppend(this, item, ((tSpiderTypeRef){&gSpiderScript_TemplateArg0,0}));
\treturn 0;
}
\t#undef SS_ERRRET
tSpiderClass gExports_class_List = {
\t.Next=NULL,
\t.Name=\"List\",
\t.TypeDef={.Class=SS_TYPECLASS_NCLASS,{.NClass=&gExports_class_List}},
\t.ConstructorProto=NULL,
\t.Constructor=NULL,
\t.Destructor=NULL,
\t.Methods=&gExports_fcn_List_Add,
\t.NMetaArgs=1,
\t.NAttributes=0,
\t.AttributeDefs={
\t\t{NULL,{NULL,0},0,0}
\t},
};
";
        assert_eq!(emit("list.ssf", source), expected);
    }

    #[test]
    fn test_translation_is_deterministic() {
        let source = SourceFile {
            name: "lang.ssf".to_string(),
            text: "\
@NAMESPACE Lang
@{
@CLASS Map
@{
@FUNCTION void Clear ()
@{
@}
@}
@FUNCTION * Get (* key, ...)
@{
@RETURN @TYPEOF([0]);
@}
@}
"
            .to_string(),
        };
        let first = translate_source(&source, Some("exports.h")).unwrap();
        let second = translate_source(&source, Some("exports.h")).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("// Auto-generated from 'lang.ssf'\n#include <spiderscript.h>\n"));
        assert!(first.contains("#include <exports.h>\n"));
    }

    #[test]
    fn test_global_functions_link_back() {
        let source = "\
@FUNCTION void first ()
@{
@}
@FUNCTION void second ()
@{
@}
";
        let out = emit("t.ssf", source);
        assert!(out.contains("tSpiderFunction gExports_fcn_first = {\n\t.Next=NULL, .Name=\"first\","));
        assert!(out.contains("tSpiderFunction gExports_fcn_second = {\n\t.Next=&gExports_fcn_first, .Name=\"second\","));
        // Void bodies fall off with an explicit success
        assert!(out.contains("\treturn 0;\n}\n\t#undef SS_ERRRET\n"));
    }

    #[test]
    fn test_methods_chain_within_class() {
        let source = "\
@CLASS Map
@{
@FUNCTION Integer Count ()
@{
@RETURN 0;
@}
@FUNCTION void Clear ()
@{
@}
@}
";
        let out = emit("t.ssf", source);
        assert!(out.contains("tSpiderFunction gExports_fcn_Map_Count = {\n\t.Next=NULL, .Name=\"Count\","));
        assert!(out.contains("tSpiderFunction gExports_fcn_Map_Clear = {\n\t.Next=&gExports_fcn_Map_Count, .Name=\"Clear\","));
        assert!(out.contains("\t.Methods=&gExports_fcn_Map_Clear,\n"));
        assert!(out.contains("\tconst tSpiderObject* this = Args[0];\n\t(void)this;\n"));
    }

    #[test]
    fn test_preamble_macros() {
        let text = preamble("in.ssf", None);
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains(PROTO_MACRO));
        assert!(text.contains("#define __SS_BUGCHECK(cnd)"));
        assert!(!text.contains("#include <in"));
    }

    #[test]
    fn test_variadic_prototype_and_unpacking() {
        let decl = global("Lang@Print", "void", "String fmt, ...");
        let record = prototype_record(&decl);
        assert!(record.contains("\t.ReturnType={NULL,0},.Args={\n"));
        assert!(record.contains("\t.bVariableArgs=1,\n"));

        let header = function_header(&decl, Some("gExports_fcn_Other"), "in.ssf", 7);
        assert!(header.starts_with("#define SS_ERRRET -1\n"));
        assert!(header.contains(".Next=&gExports_fcn_Other,"));
        assert!(header.contains("\t__SS_BUGCHECK(NArgs >= 1);\n"));
        assert!(header.contains("\tconst int VArgC = NArgs - 1;\n"));
        assert!(header.contains("\tconst void *const*const VArgV = &Args[1];\n"));
        assert!(header.contains("\tconst tSpiderString* fmt = Args[0];\n"));
        assert!(header.ends_with("# 7 \"in.ssf\"\n"));
    }

    #[test]
    fn test_destructor_header_and_trailer() {
        let class = ClassDecl::new("Lang@File".to_string(), None);
        let decl = FunctionDecl {
            kind: FunctionKind::Destructor,
            name: "__destructor".to_string(),
            symbol: "Lang_File___destructor".to_string(),
            receiver: Some(Receiver::for_class(&class)),
            params: Vec::new(),
            ret: TypeDescriptor::scalar(BaseType::Void),
            variadic: false,
        };
        assert_eq!(
            function_header(&decl, None, "in.ssf", 2),
            "#define SS_ERRRET ((void)0)\nvoid Exports_fcn_Lang_File___destructor(tSpiderObject *this)\n{\n"
        );
        assert_eq!(function_trailer(&decl, ""), "}\n\t#undef SS_ERRRET\n");
    }

    #[test]
    fn test_class_record() {
        let mut class = ClassDecl::new("Lang@File".to_string(), None);
        class.destructor = Some(FunctionDecl {
            kind: FunctionKind::Destructor,
            name: "__destructor".to_string(),
            symbol: "Lang_File___destructor".to_string(),
            receiver: Some(Receiver::for_class(&class)),
            params: Vec::new(),
            ret: TypeDescriptor::scalar(BaseType::Void),
            variadic: false,
        });

        let expected = "\
tSpiderClass gExports_class_Lang_File = {
\t.Next=&gExports_class_Lang_Dir,
\t.Name=\"Lang@File\",
\t.TypeDef={.Class=SS_TYPECLASS_NCLASS,{.NClass=&gExports_class_Lang_File}},
\t.ConstructorProto=NULL,
\t.Constructor=NULL,
\t.Destructor=Exports_fcn_Lang_File___destructor,
\t.Methods=NULL,
\t.NMetaArgs=0,
\t.NAttributes=0,
\t.AttributeDefs={
\t\t{NULL,{NULL,0},0,0}
\t},
};
";
        assert_eq!(class_record(&class, Some("gExports_class_Lang_Dir"), ""), expected);

        let indented = class_record(&class, None, "    ");
        assert!(indented.lines().all(|l| l.starts_with("    ")));
    }
}
