use runic_object::{ObjectImage, dump_object};

use crate::cli::DumpParams;

pub fn run(params: DumpParams) -> i32 {
    let image = match ObjectImage::from_path(&params.object) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("runic: {}: {err}", params.object.display());
            return 1;
        }
    };

    print!("{}", dump_object(&image));
    0
}
