use std::fmt::{self, Display, Formatter};

use serde_derive::Deserialize;

use crate::{syntax::is_symbol_char, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordKind {
    Registers,
    Prefixes,
    Types,
    Instructions,
    Preprocessor,
    Directives,
}

impl KeywordKind {
    /// In the order the classifier tries them.
    pub const ALL: [Self; 6] = [
        Self::Registers,
        Self::Prefixes,
        Self::Types,
        Self::Instructions,
        Self::Preprocessor,
        Self::Directives,
    ];
}

impl Display for KeywordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Registers => "registers",
            Self::Prefixes => "prefixes",
            Self::Types => "types",
            Self::Instructions => "instructions",
            Self::Preprocessor => "preprocessor",
            Self::Directives => "directives",
        })
    }
}

/// Case-insensitive set of whole-identifier keywords. Stored lowercased
/// and sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    kind: KeywordKind,
    words: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(kind: KeywordKind, words: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            kind,
            words: Vec::new(),
        };
        set.extend(words)?;
        Ok(set)
    }

    fn builtin(kind: KeywordKind, words: impl IntoIterator<Item = String>) -> Self {
        let mut words: Vec<String> = words.into_iter().collect();
        words.sort_unstable();
        words.dedup();
        Self { kind, words }
    }

    pub fn extend<I, S>(&mut self, words: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                return Err(Error::Keyword(format!("empty word in {} table", self.kind)));
            }
            if !word.chars().all(is_symbol_char) {
                return Err(Error::Keyword(format!(
                    "`{word}` in {} table is not an identifier",
                    self.kind
                )));
            }
            self.words.push(word.to_ascii_lowercase());
        }
        self.words.sort_unstable();
        self.words.dedup();
        Ok(())
    }

    pub fn kind(&self) -> KeywordKind {
        self.kind
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words
            .binary_search(&word.to_ascii_lowercase())
            .is_ok()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTables {
    registers: KeywordSet,
    prefixes: KeywordSet,
    types: KeywordSet,
    instructions: KeywordSet,
    preprocessor: KeywordSet,
    directives: KeywordSet,
}

impl KeywordTables {
    /// The stock x86/NASM vocabulary.
    pub fn nasm() -> Self {
        let statics = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        let mut registers = statics(REGISTERS);
        for (family, count) in REGISTER_FAMILIES {
            registers.extend((0..*count).map(|n| format!("{family}{n}")));
        }
        for n in 8..16 {
            registers.extend(["", "b", "w", "d"].iter().map(|suffix| format!("r{n}{suffix}")));
        }
        Self {
            registers: KeywordSet::builtin(KeywordKind::Registers, registers),
            prefixes: KeywordSet::builtin(KeywordKind::Prefixes, statics(PREFIXES)),
            types: KeywordSet::builtin(KeywordKind::Types, statics(TYPES)),
            instructions: KeywordSet::builtin(KeywordKind::Instructions, statics(INSTRUCTIONS)),
            preprocessor: KeywordSet::builtin(KeywordKind::Preprocessor, statics(PREPROCESSOR)),
            directives: KeywordSet::builtin(KeywordKind::Directives, statics(DIRECTIVES)),
        }
    }

    pub fn get(&self, kind: KeywordKind) -> &KeywordSet {
        match kind {
            KeywordKind::Registers => &self.registers,
            KeywordKind::Prefixes => &self.prefixes,
            KeywordKind::Types => &self.types,
            KeywordKind::Instructions => &self.instructions,
            KeywordKind::Preprocessor => &self.preprocessor,
            KeywordKind::Directives => &self.directives,
        }
    }

    pub fn extend<I, S>(&mut self, kind: KeywordKind, words: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = match kind {
            KeywordKind::Registers => &mut self.registers,
            KeywordKind::Prefixes => &mut self.prefixes,
            KeywordKind::Types => &mut self.types,
            KeywordKind::Instructions => &mut self.instructions,
            KeywordKind::Preprocessor => &mut self.preprocessor,
            KeywordKind::Directives => &mut self.directives,
        };
        set.extend(words)
    }
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self::nasm()
    }
}

const REGISTER_FAMILIES: &[(&str, u8)] = &[
    ("st", 8),
    ("mm", 8),
    ("xmm", 32),
    ("ymm", 32),
    ("zmm", 32),
    ("k", 8),
    ("dr", 8),
    ("bnd", 4),
];

#[rustfmt::skip]
const REGISTERS: &[&str] = &[
    "al", "ah", "ax", "eax", "rax",
    "bl", "bh", "bx", "ebx", "rbx",
    "cl", "ch", "cx", "ecx", "rcx",
    "dl", "dh", "dx", "edx", "rdx",
    "si", "esi", "rsi", "sil",
    "di", "edi", "rdi", "dil",
    "sp", "esp", "rsp", "spl",
    "bp", "ebp", "rbp", "bpl",
    "ip", "eip", "rip",
    "cs", "ds", "es", "fs", "gs", "ss",
    "cr0", "cr2", "cr3", "cr4", "cr8",
    "tr3", "tr4", "tr5", "tr6", "tr7",
];

#[rustfmt::skip]
const PREFIXES: &[&str] = &[
    "a16", "a32", "a64", "o16", "o32", "o64",
    "lock", "rep", "repe", "repne", "repnz", "repz",
    "times", "xacquire", "xrelease", "bnd", "nobnd",
];

#[rustfmt::skip]
const TYPES: &[&str] = &[
    "byte", "word", "dword", "qword", "tword", "oword", "yword", "zword",
    "far", "near", "short", "strict", "to", "nosplit", "abs", "rel", "seg", "wrt",
];

#[rustfmt::skip]
const DIRECTIVES: &[&str] = &[
    "absolute", "align", "alignb", "at", "bits", "common", "cpu", "debug",
    "default", "endstruc", "export", "extern", "float", "global", "gprefix",
    "gpostfix", "group", "iend", "import", "istruc", "library", "list",
    "lprefix", "lpostfix", "module", "org", "osabi", "required", "safeseh",
    "sectalign", "section", "segment", "static", "struc", "use16", "use32",
    "use64", "warning",
];

#[rustfmt::skip]
const PREPROCESSOR: &[&str] = &[
    "%define", "%xdefine", "%idefine", "%xidefine", "%undef", "%defalias",
    "%undefalias", "%assign", "%iassign", "%defstr", "%deftok", "%strlen",
    "%substr", "%strcat", "%macro", "%imacro", "%rmacro", "%irmacro",
    "%endmacro", "%unmacro", "%unimacro", "%exitmacro", "%rotate", "%rep",
    "%endrep", "%exitrep", "%if", "%ifn", "%ifdef", "%ifndef", "%ifmacro",
    "%ifnmacro", "%ifctx", "%ifnctx", "%ifidn", "%ifnidn", "%ifidni",
    "%ifnidni", "%ifid", "%ifnid", "%ifnum", "%ifnnum", "%ifstr", "%ifnstr",
    "%iftoken", "%ifntoken", "%ifempty", "%ifnempty", "%ifenv", "%ifnenv",
    "%elif", "%elifn", "%elifdef", "%elifndef", "%elifmacro", "%elifctx",
    "%elifidn", "%elifidni", "%elifid", "%elifnum", "%elifstr", "%eliftoken",
    "%elifempty", "%elifenv", "%else", "%endif", "%include", "%pathsearch",
    "%depend", "%use", "%push", "%pop", "%repl", "%line", "%error",
    "%warning", "%fatal", "%clear", "%arg", "%stacksize", "%local", "%pragma",
];

#[rustfmt::skip]
const INSTRUCTIONS: &[&str] = &[
    // pseudo-instructions
    "db", "dw", "dd", "dq", "dt", "do", "dy", "dz",
    "resb", "resw", "resd", "resq", "rest", "reso", "resy", "resz",
    "incbin", "equ",
    // general purpose
    "aaa", "aad", "aam", "aas", "adc", "adcx", "add", "adox", "and", "andn",
    "arpl", "bextr", "blsi", "blsmsk", "blsr", "bound", "bsf", "bsr",
    "bswap", "bt", "btc", "btr", "bts", "bzhi", "call", "cbw", "cdq", "cdqe",
    "clac", "clc", "cld", "clflush", "clflushopt", "cli", "clts", "clwb",
    "cmc", "cmova", "cmovae", "cmovb", "cmovbe", "cmovc", "cmove", "cmovg",
    "cmovge", "cmovl", "cmovle", "cmovna", "cmovnae", "cmovnb", "cmovnbe",
    "cmovnc", "cmovne", "cmovng", "cmovnge", "cmovnl", "cmovnle", "cmovno",
    "cmovnp", "cmovns", "cmovnz", "cmovo", "cmovp", "cmovpe", "cmovpo",
    "cmovs", "cmovz", "cmp", "cmpsb", "cmpsd", "cmpsq", "cmpsw", "cmpxchg",
    "cmpxchg8b", "cmpxchg16b", "cpuid", "cqo", "crc32", "cwd", "cwde", "daa",
    "das", "dec", "div", "enter", "hlt", "idiv", "imul", "in", "inc", "insb",
    "insd", "insw", "int", "int1", "int3", "into", "invd", "invlpg", "invpcid",
    "iret", "iretd", "iretq", "iretw", "ja", "jae", "jb", "jbe", "jc", "jcxz",
    "je", "jecxz", "jg", "jge", "jl", "jle", "jmp", "jna", "jnae", "jnb",
    "jnbe", "jnc", "jne", "jng", "jnge", "jnl", "jnle", "jno", "jnp", "jns",
    "jnz", "jo", "jp", "jpe", "jpo", "jrcxz", "js", "jz", "lahf", "lar",
    "lds", "lea", "leave", "les", "lfence", "lfs", "lgdt", "lgs", "lidt",
    "lldt", "lmsw", "lodsb", "lodsd", "lodsq", "lodsw", "loop", "loope",
    "loopne", "loopnz", "loopz", "lsl", "lss", "ltr", "lzcnt", "mfence",
    "monitor", "mov", "movbe", "movsb", "movsd", "movsq", "movsw", "movsx",
    "movsxd", "movzx", "mul", "mulx", "mwait", "neg", "nop", "not", "or",
    "out", "outsb", "outsd", "outsw", "pause", "pdep", "pext", "pop", "popa",
    "popad", "popcnt", "popf", "popfd", "popfq", "prefetch", "prefetchnta",
    "prefetcht0", "prefetcht1", "prefetcht2", "prefetchw", "push", "pusha",
    "pushad", "pushf", "pushfd", "pushfq", "rcl", "rcr", "rdfsbase",
    "rdgsbase", "rdmsr", "rdpid", "rdpmc", "rdrand", "rdseed", "rdtsc",
    "rdtscp", "ret", "retf", "retn", "rol", "ror", "rorx", "rsm", "sahf",
    "sal", "sar", "sarx", "sbb", "scasb", "scasd", "scasq", "scasw", "seta",
    "setae", "setb", "setbe", "setc", "sete", "setg", "setge", "setl",
    "setle", "setna", "setnae", "setnb", "setnbe", "setnc", "setne", "setng",
    "setnge", "setnl", "setnle", "setno", "setnp", "setns", "setnz", "seto",
    "setp", "setpe", "setpo", "sets", "setz", "sfence", "sgdt", "shl", "shld",
    "shlx", "shr", "shrd", "shrx", "sidt", "sldt", "smsw", "stac", "stc",
    "std", "sti", "stosb", "stosd", "stosq", "stosw", "str", "sub", "swapgs",
    "syscall", "sysenter", "sysexit", "sysret", "test", "tzcnt", "ud0", "ud1",
    "ud2", "verr", "verw", "wait", "wbinvd", "wrfsbase", "wrgsbase", "wrmsr",
    "xadd", "xabort", "xbegin", "xchg", "xend", "xgetbv", "xlat", "xlatb",
    "xor", "xrstor", "xsave", "xsaveopt", "xsetbv", "xtest",
    // x87
    "f2xm1", "fabs", "fadd", "faddp", "fbld", "fbstp", "fchs", "fclex",
    "fcmovb", "fcmovbe", "fcmove", "fcmovnb", "fcmovnbe", "fcmovne",
    "fcmovnu", "fcmovu", "fcom", "fcomi", "fcomip", "fcomp", "fcompp", "fcos",
    "fdecstp", "fdiv", "fdivp", "fdivr", "fdivrp", "ffree", "fiadd", "ficom",
    "ficomp", "fidiv", "fidivr", "fild", "fimul", "fincstp", "finit", "fist",
    "fistp", "fisttp", "fisub", "fisubr", "fld", "fld1", "fldcw", "fldenv",
    "fldl2e", "fldl2t", "fldlg2", "fldln2", "fldpi", "fldz", "fmul", "fmulp",
    "fnclex", "fninit", "fnop", "fnsave", "fnstcw", "fnstenv", "fnstsw",
    "fpatan", "fprem", "fprem1", "fptan", "frndint", "frstor", "fsave",
    "fscale", "fsin", "fsincos", "fsqrt", "fst", "fstcw", "fstenv", "fstp",
    "fstsw", "fsub", "fsubp", "fsubr", "fsubrp", "ftst", "fucom", "fucomi",
    "fucomip", "fucomp", "fucompp", "fwait", "fxam", "fxch", "fxrstor",
    "fxsave", "fxtract", "fyl2x", "fyl2xp1",
    // mmx / sse / avx
    "addpd", "addps", "addsd", "addss", "addsubpd", "addsubps", "aesdec",
    "aesdeclast", "aesenc", "aesenclast", "aesimc", "aeskeygenassist",
    "andnpd", "andnps", "andpd", "andps", "blendpd", "blendps", "blendvpd",
    "blendvps", "cmppd", "cmpps", "cmpss", "comisd", "comiss", "cvtdq2pd",
    "cvtdq2ps", "cvtpd2dq", "cvtpd2ps", "cvtps2dq", "cvtps2pd", "cvtsd2si",
    "cvtsd2ss", "cvtsi2sd", "cvtsi2ss", "cvtss2sd", "cvtss2si", "cvttpd2dq",
    "cvttps2dq", "cvttsd2si", "cvttss2si", "divpd", "divps", "divsd", "divss",
    "dppd", "dpps", "emms", "extractps", "haddpd", "haddps", "hsubpd",
    "hsubps", "insertps", "lddqu", "ldmxcsr", "maskmovdqu", "maskmovq",
    "maxpd", "maxps", "maxsd", "maxss", "minpd", "minps", "minsd", "minss",
    "movapd", "movaps", "movd", "movddup", "movdq2q", "movdqa", "movdqu",
    "movhlps", "movhpd", "movhps", "movlhps", "movlpd", "movlps", "movmskpd",
    "movmskps", "movntdq", "movntdqa", "movnti", "movntpd", "movntps",
    "movntq", "movq", "movq2dq", "movshdup", "movsldup", "movss", "movupd",
    "movups", "mpsadbw", "mulpd", "mulps", "mulsd", "mulss", "orpd", "orps",
    "pabsb", "pabsd", "pabsw", "packssdw", "packsswb", "packusdw", "packuswb",
    "paddb", "paddd", "paddq", "paddsb", "paddsw", "paddusb", "paddusw",
    "paddw", "palignr", "pand", "pandn", "pavgb", "pavgw", "pblendvb",
    "pblendw", "pclmulqdq", "pcmpeqb", "pcmpeqd", "pcmpeqq", "pcmpeqw",
    "pcmpestri", "pcmpestrm", "pcmpgtb", "pcmpgtd", "pcmpgtq", "pcmpgtw",
    "pcmpistri", "pcmpistrm", "pextrb", "pextrd", "pextrq", "pextrw",
    "phaddd", "phaddsw", "phaddw", "phminposuw", "phsubd", "phsubsw",
    "phsubw", "pinsrb", "pinsrd", "pinsrq", "pinsrw", "pmaddubsw", "pmaddwd",
    "pmaxsb", "pmaxsd", "pmaxsw", "pmaxub", "pmaxud", "pmaxuw", "pminsb",
    "pminsd", "pminsw", "pminub", "pminud", "pminuw", "pmovmskb", "pmovsxbd",
    "pmovsxbq", "pmovsxbw", "pmovsxdq", "pmovsxwd", "pmovsxwq", "pmovzxbd",
    "pmovzxbq", "pmovzxbw", "pmovzxdq", "pmovzxwd", "pmovzxwq", "pmuldq",
    "pmulhrsw", "pmulhuw", "pmulhw", "pmulld", "pmullw", "pmuludq", "por",
    "psadbw", "pshufb", "pshufd", "pshufhw", "pshuflw", "pshufw", "psignb",
    "psignd", "psignw", "pslld", "pslldq", "psllq", "psllw", "psrad", "psraw",
    "psrld", "psrldq", "psrlq", "psrlw", "psubb", "psubd", "psubq", "psubsb",
    "psubsw", "psubusb", "psubusw", "psubw", "ptest", "punpckhbw",
    "punpckhdq", "punpckhqdq", "punpckhwd", "punpcklbw", "punpckldq",
    "punpcklqdq", "punpcklwd", "pxor", "rcpps", "rcpss", "roundpd", "roundps",
    "roundsd", "roundss", "rsqrtps", "rsqrtss", "sha1msg1", "sha1msg2",
    "sha1nexte", "sha1rnds4", "sha256msg1", "sha256msg2", "sha256rnds2",
    "shufpd", "shufps", "sqrtpd", "sqrtps", "sqrtsd", "sqrtss", "stmxcsr",
    "subpd", "subps", "subsd", "subss", "ucomisd", "ucomiss", "unpckhpd",
    "unpckhps", "unpcklpd", "unpcklps", "xorpd", "xorps",
    "vaddpd", "vaddps", "vaddsd", "vaddss", "vandnpd", "vandnps", "vandpd",
    "vandps", "vblendvpd", "vblendvps", "vbroadcastf128", "vbroadcasti128",
    "vbroadcastsd", "vbroadcastss", "vcmppd", "vcmpps", "vcmpsd", "vcmpss",
    "vcvtdq2pd", "vcvtdq2ps", "vcvtpd2ps", "vcvtps2pd", "vcvtsd2ss",
    "vcvtss2sd", "vdivpd", "vdivps", "vdivsd", "vdivss", "vextractf128",
    "vextracti128", "vfmadd132pd", "vfmadd132ps", "vfmadd213pd",
    "vfmadd213ps", "vfmadd231pd", "vfmadd231ps", "vinsertf128",
    "vinserti128", "vmaskmovpd", "vmaskmovps", "vmaxpd", "vmaxps", "vminpd",
    "vminps", "vmovapd", "vmovaps", "vmovd", "vmovddup", "vmovdqa",
    "vmovdqu", "vmovq", "vmovsd", "vmovss", "vmovupd", "vmovups", "vmulpd",
    "vmulps", "vmulsd", "vmulss", "vorpd", "vorps", "vpaddb", "vpaddd",
    "vpaddq", "vpaddw", "vpand", "vpandn", "vpbroadcastb", "vpbroadcastd",
    "vpbroadcastq", "vpbroadcastw", "vpcmpeqb", "vpcmpeqd", "vpcmpeqq",
    "vpcmpeqw", "vperm2f128", "vperm2i128", "vpermd", "vpermilpd",
    "vpermilps", "vpermpd", "vpermps", "vpermq", "vpmovmskb", "vpor",
    "vpshufb", "vpshufd", "vpslld", "vpsllq", "vpsrld", "vpsrlq", "vpsubb",
    "vpsubd", "vpsubq", "vpsubw", "vptest", "vpxor", "vshufpd", "vshufps",
    "vsqrtpd", "vsqrtps", "vsubpd", "vsubps", "vsubsd", "vsubss", "vtestpd",
    "vtestps", "vxorpd", "vxorps", "vzeroall", "vzeroupper",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_valid_identifiers() {
        let tables = KeywordTables::nasm();
        for kind in KeywordKind::ALL {
            let set = tables.get(kind);
            assert!(set.words().next().is_some(), "{kind} table is empty");
            // re-validating through the checked constructor must not fail
            assert!(KeywordSet::new(kind, set.words()).is_ok(), "{kind}");
        }
    }

    #[test]
    fn builtin_tables_are_disjoint() {
        let tables = KeywordTables::nasm();
        for (i, a) in KeywordKind::ALL.iter().enumerate() {
            for b in &KeywordKind::ALL[i + 1..] {
                for word in tables.get(*a).words() {
                    assert!(
                        !tables.get(*b).contains(word),
                        "`{word}` is in both {a} and {b}"
                    );
                }
            }
        }
    }

    #[test]
    fn lookups_ignore_case() {
        let tables = KeywordTables::nasm();
        assert!(tables.get(KeywordKind::Registers).contains("EAX"));
        assert!(tables.get(KeywordKind::Registers).contains("xmm31"));
        assert!(tables.get(KeywordKind::Registers).contains("r12d"));
        assert!(tables.get(KeywordKind::Instructions).contains("Mov"));
        assert!(tables.get(KeywordKind::Preprocessor).contains("%DEFINE"));
        assert!(!tables.get(KeywordKind::Instructions).contains("foo"));
    }

    #[test]
    fn malformed_words_are_rejected() {
        assert!(matches!(
            KeywordSet::new(KeywordKind::Instructions, [""]),
            Err(Error::Keyword(_))
        ));
        assert!(matches!(
            KeywordSet::new(KeywordKind::Instructions, ["two words"]),
            Err(Error::Keyword(_))
        ));
        let mut tables = KeywordTables::nasm();
        assert!(tables.extend(KeywordKind::Registers, ["a-b"]).is_err());
        tables
            .extend(KeywordKind::Instructions, ["MyMacro"])
            .unwrap();
        assert!(tables.get(KeywordKind::Instructions).contains("mymacro"));
    }
}
