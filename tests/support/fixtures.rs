/// Three-person family with nothing to report under the default rules.
pub const CLEAN_TREE: &str = "\
0 HEAD
1 GEDC
2 VERS 5.5.1
1 CHAR UTF-8
0 @I1@ INDI
1 NAME John /Smith/
1 SEX M
1 BIRT
2 DATE 12 MAR 1820
2 PLAC Leeds, Yorkshire, England
1 DEAT
2 DATE 1890
1 FAMS @F1@
0 @I2@ INDI
1 NAME Mary /Jones/
1 SEX F
1 BIRT
2 DATE 1825
1 FAMS @F1@
0 @I3@ INDI
1 NAME Thomas /Smith/
1 SEX M
1 BIRT
2 DATE 4 JUN 1850
1 FAMC @F1@
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 CHIL @I3@
1 MARR
2 DATE 1848
0 TRLR
";

/// I1 has an approximate birth after an exact death, I2 has no birth, and
/// F1 points at two individuals that do not exist.
pub const PROBLEM_TREE: &str = "\
0 HEAD
1 CHAR UTF-8
0 @I1@ INDI
1 NAME Ann /Baker/
1 SEX F
1 BIRT
2 DATE ABT 1850
1 DEAT
2 DATE 1820
0 @I2@ INDI
1 NAME Ben /Baker/
1 SEX M
1 FAMS @F1@
0 @F1@ FAM
1 HUSB @I2@
1 WIFE @I9@
1 CHIL @I8@
1 MARR
2 DATE 1870
0 TRLR
";

/// Birth date on a day March does not have.
pub const MALFORMED_DATE_TREE: &str = "\
0 HEAD
0 @I1@ INDI
1 NAME Carl /Weber/
1 SEX M
1 BIRT
2 DATE 32 MAR 1901
0 TRLR
";

/// Level jumps from 0 to 2 on line 3.
pub const BROKEN_SYNTAX: &str = "\
0 HEAD
0 @I1@ INDI
2 NAME Broken /Line/
0 TRLR
";
