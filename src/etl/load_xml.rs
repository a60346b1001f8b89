use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;

use log::{debug, info};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::config::{Compression, LoadOptions};
use crate::data::OsmMapData;
use crate::errors::{Error, Position, Result};
use crate::etl::{parse_osm::OsmParser, postprocess, Etl};

const ETL_NAME: &str = "load_xml";
/// Size of the chunks read from the input and handed to the tokenizer.
const CHUNK_SIZE: usize = 64 * 1024;

/// Where the XML comes from.
pub enum Input<'r> {
    Stdin,
    File(PathBuf),
    Reader(Box<dyn Read + 'r>),
}

impl Input<'_> {
    /// `-` selects standard input, anything else is a file path.
    pub fn from_arg(arg: &str) -> Input<'static> {
        if arg == "-" {
            Input::Stdin
        } else {
            Input::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stdin => f.write_str("Stdin"),
            Input::File(path) => f.debug_tuple("File").field(path).finish(),
            Input::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// Buffered reader that remembers the line and column of the next byte to be
/// consumed, so tokenizer and grammar errors can point into the input.
pub struct PositionReader<R> {
    inner: BufReader<R>,
    line: u64,
    column: u64,
}

impl<R: Read> PositionReader<R> {
    pub fn new(inner: R) -> Self {
        PositionReader {
            inner: BufReader::with_capacity(CHUNK_SIZE, inner),
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }
}

impl<R: Read> Read for PositionReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = {
            let available = self.inner.fill_buf()?;
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            n
        };
        self.consume(n);
        Ok(n)
    }
}

impl<R: Read> BufRead for PositionReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        for &byte in self.inner.buffer().iter().take(amt) {
            if byte == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.inner.consume(amt);
    }
}

/// Loads one OSM XML document into a store.
///
/// Extraction opens the input, transformation streams it through the element
/// dispatcher, and loading finalizes the dataset bounding box. The input and
/// the tokenizer are owned by the phases and dropped on every exit path.
pub struct XmlLoadEtl<'a, 'r> {
    input: Option<Input<'r>>,
    store: &'a mut OsmMapData,
    options: &'a LoadOptions,
}

impl<'a, 'r> XmlLoadEtl<'a, 'r> {
    pub fn new(input: Input<'r>, store: &'a mut OsmMapData, options: &'a LoadOptions) -> Self {
        XmlLoadEtl {
            input: Some(input),
            store,
            options,
        }
    }

    fn open(&self, input: Input<'r>) -> Result<Box<dyn Read + 'r>> {
        let (source, xz_name): (Box<dyn Read + 'r>, bool) = match input {
            Input::Stdin => (Box::new(io::stdin().lock()), false),
            Input::Reader(reader) => (reader, false),
            Input::File(path) => {
                let file = fs::File::open(&path).map_err(|source| Error::System {
                    context: "cannot open input file",
                    source,
                })?;
                debug!(etl_name = ETL_NAME, path = &*path.to_string_lossy(); "Opened input file");
                (Box::new(file), path.extension().is_some_and(|ext| ext == "xz"))
            },
        };

        let xz = match self.options.compression {
            Compression::Auto => xz_name,
            Compression::None => false,
            Compression::Xz => true,
        };
        if xz {
            Ok(Box::new(XzDecoder::new(BufReader::new(source))))
        } else {
            Ok(source)
        }
    }
}

impl<'a, 'r> Etl for XmlLoadEtl<'a, 'r> {
    type Input = Reader<PositionReader<Box<dyn Read + 'r>>>;
    type Output = ();

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn extract(&mut self) -> Result<Self::Input> {
        let input = self.input.take().ok_or("input was already consumed")?;
        self.store.bbox = Default::default();

        let mut reader = Reader::from_reader(PositionReader::new(self.open(input)?));
        reader.trim_text(true);
        Ok(reader)
    }

    fn transform(&mut self, mut reader: Self::Input) -> Result<Self::Output> {
        let mut parser = OsmParser::new(self.store, self.options);
        let mut buf = Vec::new();

        loop {
            let result = match reader.read_event_into(&mut buf) {
                Err(err) => Err(Error::from(err)),
                Ok(Event::Eof) => break,
                Ok(Event::Start(el)) => parser.start_element(&el),
                Ok(Event::Empty(el)) => {
                    parser.start_element(&el).and_then(|()| parser.end_element())
                },
                Ok(Event::End(_)) => parser.end_element(),
                Ok(Event::Text(text)) => parser.text(&text),
                Ok(Event::CData(data)) => parser.text(&data),
                // Comments, declarations and the like carry no map data.
                Ok(_) => Ok(()),
            };
            if let Err(err) = result {
                return Err(err.at(reader.get_ref().position()));
            }
            buf.clear();
        }

        parser.finish().map_err(|err| err.at(reader.get_ref().position()))
    }

    fn load(&mut self, _output: Self::Output) -> Result<()> {
        let recomputed = postprocess::finish_dataset(self.store);
        let bbox = self.store.bbox.to_string();
        info!(
            etl_name = ETL_NAME,
            nodes = self.store.node_count(),
            ways = self.store.way_count(),
            relations = self.store.relation_count(),
            bbox = bbox.as_str(),
            bbox_recomputed = recomputed;
            "Dataset loaded"
        );
        Ok(())
    }
}
