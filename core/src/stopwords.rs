use crate::config::Language;
use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    static ref INDONESIAN: HashSet<&'static str> = {
        let words: &[&str] = &[
            "ada","adalah","agak","agar","akan","amat","anda","antara","apakah","apalagi","atau",
            "bagaimanapun","bagi","bahwa","begitu","belum","bisa","boleh",
            "dahulu","dalam","dan","dapat","dari","daripada","demi","demikian","dengan","di","dia","dimana","dll","dsb","dst","dua","dulunya",
            "guna","hal","hanya","harus","ia","ingin","ini","itu","itulah",
            "jika","juga","kah","kami","karena","ke","kecuali","kembali","kemana","kenapa","kepada","ketika","kita",
            "lagi","lain","maka","mari","masih","melainkan","menurut","mengapa","mereka",
            "namun","nanti","nggak","oh","ok","oleh","pada","para","pasti","pula","pun",
            "saat","saja","saya","sambil","sampai","seharusnya","sebab","sebagai","sebelum","sebetulnya","secara",
            "sedangkan","sehingga","sekitar","selagi","selain","sementara","seolah","seperti","seraya","serta",
            "sesuatu","sesudah","setelah","seterusnya","setiap","setidaknya","sudah","supaya",
            "tanpa","tapi","telah","tentang","tentu","terhadap","tetapi","tidak","toh","tolong",
            "untuk","walau","ya","yaitu","yakni","yang",
        ];
        words.iter().copied().collect()
    };
    static ref ENGLISH: HashSet<&'static str> = {
        // contractions appear split at the apostrophe, as the tokenizer yields them
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could","couldn",
            "did","didn","do","does","doesn","doing","don","down","during",
            "each",
            "few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "let","ll",
            "me","more","most","mustn","my","myself",
            "no","nor","not",
            "of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "re",
            "same","she","should","shouldn","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up",
            "ve","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","with","won","would","wouldn",
            "you","your","yours","yourself","yourselves",
        ];
        words.iter().copied().collect()
    };
}

/// The fixed stopword set for a language.
pub fn stopwords(language: Language) -> &'static HashSet<&'static str> {
    match language {
        Language::Indonesian => &INDONESIAN,
        Language::English => &ENGLISH,
    }
}
